//! # Auth Module
//!
//! This module handles session establishment and registration:
//! - Bearer token parsing (`BearerToken` extractor)
//! - Session cookie issuance through the identity provider
//! - Sign-in and sign-up form schemas with localized messages

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::auth_routes;
