// src/main.rs
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod common;
mod i18n;
mod logging_middleware;
mod pages;
mod services;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use common::config::AppConfig;
use common::dev_mode::{apply_cli_override, print_dev_mode_status, DevIdentityProvider, DevModeConfig};
use common::AppState;
use i18n::Catalog;
use services::{IdentityProvider, IdentityToolkitService};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env();
    info!(
        environment = ?config.environment,
        session_cookie = %config.session_cookie.name,
        session_max_age = config.session_cookie.max_age_seconds,
        default_locale = %config.default_locale,
        "Configuration loaded"
    );

    // ========================================================================
    // DEV MODE CONFIGURATION
    // ========================================================================

    let dev_mode = apply_cli_override(DevModeConfig::from_env());
    if dev_mode.is_enabled() && config.is_production() {
        anyhow::bail!("DEV_MODE cannot be enabled when APP_ENV=production");
    }
    print_dev_mode_status(&dev_mode);

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let identity: Arc<dyn IdentityProvider> = if dev_mode.is_enabled() {
        Arc::new(DevIdentityProvider::new(&dev_mode))
    } else {
        if config.identity.project_id.is_none() || config.identity.access_token.is_none() {
            warn!("IDENTITY_PROJECT_ID / IDENTITY_ACCESS_TOKEN not set; sign-in will fail");
        }
        if config.identity.api_key.is_none() {
            warn!("IDENTITY_API_KEY not set; sign-up will fail");
        }
        Arc::new(IdentityToolkitService::new(config.identity.clone()))
    };
    info!("Identity provider initialized");

    let catalog = Catalog::load()?;
    info!("Message catalogs loaded");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let port = config.port;
    let cors_origins: Vec<axum::http::HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let app_state = AppState::new(config, identity, catalog);

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        // ====================================================================
        // AUTHENTICATION ROUTES (Sign-in, Sign-up, Form validation)
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // PAGE ROUTES (GraphQL client page, Health)
        // ====================================================================
        .merge(pages::pages_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        // Add request/response logging in debug mode
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(app_state))
        .layer(
            CorsLayer::new()
                .allow_origin(cors_origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::ACCEPT_LANGUAGE,
                ])
                .allow_credentials(true),
        )
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
