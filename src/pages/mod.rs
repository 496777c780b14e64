//! # Pages Module
//!
//! Server-rendered informational pages and the liveness probe.

pub mod handlers;
pub mod routes;

pub use routes::pages_routes;
