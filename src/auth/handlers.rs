//! Authentication handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Json, Path, Query};
use axum::http::header::{HeaderName, ACCEPT_LANGUAGE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use tracing::{debug, error, info, warn};

use super::extractors::BearerToken;
use super::models::{FormCheck, LocaleQuery, SignInData, SignInForm, SignUpData, SignUpForm};
use super::validators::{sign_in_schema, sign_up_schema};
use crate::common::cookies::ResponseCookie;
use crate::common::{
    safe_email_log, safe_token_log, ApiResponse, AppError, AppErrorCode, AppState, Validator,
};
use crate::i18n::Locale;
use crate::services::{IdentityError, NewAccount};

const VALIDATION_NAMESPACE: &str = "VALIDATION";

fn sign_in_failed() -> AppError {
    AppError::unknown("Failed to sign in.")
}

/// POST /api/auth/sign-in
/// Exchanges an ID token for a session cookie and returns the signed-in user
///
/// # Request Headers
/// `Authorization: Bearer <id token>`
///
/// # Response (always HTTP 200)
/// ```json
/// { "error": null, "data": { "user": { ... } } }
/// { "error": { "code": "UserNotFound", "message": "..." }, "data": null }
/// ```
/// The session cookie is attached with `Set-Cookie` on success only.
pub async fn sign_in(
    Extension(state): Extension<AppState>,
    BearerToken(id_token): BearerToken,
) -> Result<([(HeaderName, HeaderValue); 1], Json<ApiResponse<SignInData>>), AppError> {
    info!("🔐 Received sign-in request");
    let session = &state.config.session_cookie;

    let session_cookie = state
        .identity
        .create_session_cookie(&id_token, session.expires_in())
        .await
        .map_err(|e| {
            error!(
                error = %e,
                token = %safe_token_log(&id_token),
                "Identity provider failed to create session cookie"
            );
            sign_in_failed()
        })?;

    let session_cookie = match session_cookie {
        Some(cookie) if !cookie.is_empty() => cookie,
        _ => {
            warn!(
                token = %safe_token_log(&id_token),
                "Identity provider returned no session cookie"
            );
            return Err(AppError::new(
                AppErrorCode::UnexpectedAppError,
                "Failed to create session cookie.",
            ));
        }
    };

    let set_cookie = ResponseCookie::session(
        session.name.as_str(),
        session_cookie.as_str(),
        session.max_age_seconds,
        state.config.is_production(),
    )
    .to_header_value()
    .map_err(|e| {
        error!(error = %e, "Session cookie is not a valid header value");
        sign_in_failed()
    })?;

    let user = state
        .identity
        .get_current_user(&session_cookie)
        .await
        .map_err(|e| {
            error!(error = %e, "Identity provider failed to resolve current user");
            sign_in_failed()
        })?
        .ok_or_else(|| {
            warn!(
                cookie = %safe_token_log(&session_cookie),
                "No user behind freshly issued session cookie"
            );
            AppError::new(
                AppErrorCode::UserNotFound,
                "Failed to retrieve user information after signing in.",
            )
        })?;

    info!(
        user_id = %user.uid,
        email = %user.email.as_deref().map(safe_email_log).unwrap_or_default(),
        max_age = session.max_age_seconds,
        "User signed in, session cookie issued"
    );

    Ok((
        [(SET_COOKIE, set_cookie)],
        Json(ApiResponse::success(SignInData { user })),
    ))
}

/// POST /api/auth/sign-up
/// Validates the registration form and creates the account with the identity provider
///
/// # Request Body
/// ```json
/// { "userName": "...", "email": "...", "password": "...", "confirmPassword": "..." }
/// ```
///
/// # Response (always HTTP 200)
/// ```json
/// { "error": null, "data": { "user": { ... }, "idToken": "..." } }
/// ```
pub async fn sign_up(
    Extension(state): Extension<AppState>,
    Query(query): Query<LocaleQuery>,
    headers: HeaderMap,
    payload: Result<Json<SignUpForm>, JsonRejection>,
) -> Result<Json<ApiResponse<SignUpData>>, AppError> {
    let Json(form) = payload.map_err(body_rejected)?;
    let locale = request_locale(&state, &query, &headers);

    let t = state.catalog.translator(locale, VALIDATION_NAMESPACE);
    let schema = sign_up_schema(|key: &str| t.t(key));
    let result = schema.validate(&form);
    if !result.is_valid {
        debug!(
            locale = locale.code(),
            errors = result.errors.len(),
            "Sign-up form rejected"
        );
        return Err(result.into());
    }

    let account = NewAccount {
        email: schema.cleaned(&form, "email").to_string(),
        password: schema.cleaned(&form, "password").to_string(),
        display_name: schema.cleaned(&form, "userName").to_string(),
    };

    info!(email = %safe_email_log(&account.email), "📝 Creating account");

    let outcome = state.identity.sign_up(&account).await.map_err(|e| match e {
        IdentityError::EmailExists => {
            warn!(email = %safe_email_log(&account.email), "Sign-up with an email already in use");
            AppError::new(
                AppErrorCode::EmailAlreadyInUse,
                "An account with this email already exists.",
            )
        }
        other => {
            error!(error = %other, "Identity provider failed to create account");
            AppError::unknown("Failed to sign up.")
        }
    })?;

    info!(user_id = %outcome.user.uid, "Account created");

    Ok(Json(ApiResponse::success(SignUpData {
        user: outcome.user,
        id_token: outcome.id_token,
    })))
}

/// POST /api/forms/{form}/validate
/// Runs the sign-in or sign-up schema with the request locale
///
/// # Response (always HTTP 200)
/// ```json
/// { "error": null, "data": { "valid": true } }
/// { "error": { "code": "ValidationFailed", "message": "...", "fields": [ ... ] }, "data": null }
/// ```
pub async fn validate_form(
    Extension(state): Extension<AppState>,
    Path(form): Path<String>,
    Query(query): Query<LocaleQuery>,
    headers: HeaderMap,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<ApiResponse<FormCheck>>, AppError> {
    let Json(body) = payload.map_err(body_rejected)?;
    let locale = request_locale(&state, &query, &headers);
    let t = state.catalog.translator(locale, VALIDATION_NAMESPACE);
    let lookup = |key: &str| t.t(key);

    let result = match form.as_str() {
        "sign-in" => {
            let data: SignInForm = serde_json::from_value(body).map_err(body_invalid)?;
            sign_in_schema(lookup).validate(&data)
        }
        "sign-up" => {
            let data: SignUpForm = serde_json::from_value(body).map_err(body_invalid)?;
            sign_up_schema(lookup).validate(&data)
        }
        other => {
            debug!(form = %other, "Validation requested for unknown form");
            return Err(AppError::unknown("Unknown form."));
        }
    };

    if !result.is_valid {
        return Err(result.into());
    }
    Ok(Json(ApiResponse::success(FormCheck { valid: true })))
}

// ---- Helper Functions ----

fn request_locale(state: &AppState, query: &LocaleQuery, headers: &HeaderMap) -> Locale {
    let accept_language = headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());
    Locale::negotiate(
        query.locale.as_deref(),
        accept_language,
        state.default_locale(),
    )
}

fn body_rejected(rejection: JsonRejection) -> AppError {
    warn!(error = %rejection, "Request body rejected");
    AppError::new(
        AppErrorCode::ValidationFailed,
        "Request body must be a JSON object.",
    )
}

fn body_invalid(e: serde_json::Error) -> AppError {
    warn!(error = %e, "Form body has unexpected shape");
    AppError::new(
        AppErrorCode::ValidationFailed,
        "Request body must be a JSON object.",
    )
}
