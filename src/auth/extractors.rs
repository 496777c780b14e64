//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, request::Parts};
use axum::extract::FromRequestParts;
use tracing::warn;

use crate::common::{AppError, AppErrorCode};

const BEARER_SCHEME: &str = "bearer";

fn header_missing() -> AppError {
    AppError::new(
        AppErrorCode::AuthHeaderMissing,
        "Authorization header is missing.",
    )
}

fn header_malformed() -> AppError {
    AppError::new(
        AppErrorCode::AuthHeaderMalformed,
        "Authorization header must have the form 'Bearer <token>'.",
    )
}

/// Extracts the credential from an `Authorization: Bearer <token>` value.
///
/// The scheme is matched case-insensitively and must be followed by
/// whitespace; the token is a single run of non-whitespace characters.
pub fn parse_bearer_token(header: Option<&str>) -> Result<String, AppError> {
    let header = match header {
        Some(h) if !h.trim().is_empty() => h,
        _ => return Err(header_missing()),
    };

    let (scheme, rest) = match (header.get(..BEARER_SCHEME.len()), header.get(BEARER_SCHEME.len()..)) {
        (Some(scheme), Some(rest)) => (scheme, rest),
        _ => return Err(header_malformed()),
    };

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) || !rest.starts_with(char::is_whitespace) {
        return Err(header_malformed());
    }

    let token = rest.trim();
    // A credential never contains whitespace; "Bearer a b" is two values, not one.
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(header_malformed());
    }

    Ok(token.to_string())
}

/// Bearer credential from the `Authorization` header
///
/// Rejects with the envelope error, so handlers that take it answer
/// malformed requests the same way as any other failure.
#[derive(Debug)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| {
                warn!("Authentication failed: Authorization header is not visible ASCII");
                header_malformed()
            })?),
            None => None,
        };

        parse_bearer_token(header).map(BearerToken).map_err(|e| {
            warn!(code = e.code.as_str(), "Authentication failed: unusable Authorization header");
            e
        })
    }
}
