// src/logging_middleware.rs
//! Middleware for logging requests and responses in debug mode
//!
//! Credentials never reach the log: the `Authorization` header and any
//! `Set-Cookie` value are masked.

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{debug, enabled, Level};

use crate::common::safe_token_log;

fn masked_authorization(headers: &HeaderMap) -> String {
    match headers.get(header::AUTHORIZATION).map(|v| v.to_str()) {
        None => "-".to_string(),
        Some(Ok(value)) => match value.split_once(' ') {
            Some((scheme, token)) => format!("{} {}", scheme, safe_token_log(token.trim())),
            None => safe_token_log(value),
        },
        Some(Err(_)) => "<non-ascii>".to_string(),
    }
}

fn masked_set_cookie(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|v| {
            let (pair, attributes) = v.split_once(';').unwrap_or((v, ""));
            let name = pair.split_once('=').map_or(pair, |(name, _)| name);
            format!("{}=***;{}", name, attributes)
        })
        .collect()
}

fn printable(bytes: &[u8]) -> Option<String> {
    let body_str = std::str::from_utf8(bytes).ok()?;
    // Try to parse as JSON for pretty printing
    Some(match serde_json::from_str::<serde_json::Value>(body_str) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or_else(|_| body_str.to_string()),
        Err(_) => body_str.to_string(),
    })
}

/// Middleware to log request and response bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();

    // Read request body
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    debug!(
        method = %parts.method,
        uri = %parts.uri,
        authorization = %masked_authorization(&parts.headers),
        request_body = %printable(&bytes).unwrap_or_default(),
        "📥 Request"
    );

    // Reconstruct request
    let request = Request::from_parts(parts, Body::from(bytes));

    // Call next middleware/handler
    let response = next.run(request).await;

    // Extract response parts
    let (parts, body) = response.into_parts();

    // Read response body
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    debug!(
        status = %parts.status,
        set_cookie = ?masked_set_cookie(&parts.headers),
        response_body = %printable(&bytes).unwrap_or_default(),
        "📤 Response"
    );

    // Reconstruct response
    let response = Response::from_parts(parts, Body::from(bytes));

    Ok(response)
}
