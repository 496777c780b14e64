//! Authentication routes

use axum::{routing::post, Router};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/sign-in` - Exchange an ID token for a session cookie
/// - `POST /api/auth/sign-up` - Register a new account
/// - `POST /api/forms/:form/validate` - Validate the sign-in or sign-up form
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/sign-in", post(handlers::sign_in))
        .route("/api/auth/sign-up", post(handlers::sign_up))
        .route("/api/forms/:form/validate", post(handlers::validate_form))
}
