//! Page routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the pages router
///
/// # Routes
/// - `GET /:locale/graphql-client` - GraphQL client information page
/// - `GET /health` - Liveness probe
pub fn pages_routes() -> Router {
    Router::new()
        .route("/:locale/graphql-client", get(handlers::graphql_client_page))
        .route("/health", get(handlers::health))
}
