// Error handling types for the API
//
// Every JSON route answers with the same envelope, `{ error, data }`, and
// HTTP 200. Callers tell success from failure by looking at `error`.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::validation::{ValidationError, ValidationResult};

/// Error codes surfaced to clients in `error.code`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AppErrorCode {
    AuthHeaderMissing,
    AuthHeaderMalformed,
    UnexpectedAppError,
    UserNotFound,
    UnknownError,
    ValidationFailed,
    EmailAlreadyInUse,
}

impl AppErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppErrorCode::AuthHeaderMissing => "AuthHeaderMissing",
            AppErrorCode::AuthHeaderMalformed => "AuthHeaderMalformed",
            AppErrorCode::UnexpectedAppError => "UnexpectedAppError",
            AppErrorCode::UserNotFound => "UserNotFound",
            AppErrorCode::UnknownError => "UnknownError",
            AppErrorCode::ValidationFailed => "ValidationFailed",
            AppErrorCode::EmailAlreadyInUse => "EmailAlreadyInUse",
        }
    }
}

/// Application error carried to the envelope boundary
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", .code.as_str())]
pub struct AppError {
    pub code: AppErrorCode,
    pub message: String,
    pub fields: Vec<ValidationError>,
}

impl AppError {
    pub fn new(code: AppErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(AppErrorCode::UnknownError, message)
    }
}

/// Helper function to convert ValidationResult to AppError
impl From<ValidationResult> for AppError {
    fn from(result: ValidationResult) -> Self {
        let summary: Vec<String> = result
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        Self {
            code: AppErrorCode::ValidationFailed,
            message: summary.join(", "),
            fields: result.errors,
        }
    }
}

/// JSON error body inside the envelope
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: AppErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ValidationError>,
}

/// Uniform `{ error, data }` response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub error: Option<ErrorBody>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            error: None,
            data: Some(data),
        }
    }

    pub fn failure(error: AppError) -> Self {
        Self {
            error: Some(ErrorBody {
                code: error.code,
                message: error.message,
                fields: error.fields,
            }),
            data: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        debug!(code = self.code.as_str(), message = %self.message, "Request failed");

        // Failures keep the 200 status; the envelope carries the error.
        (StatusCode::OK, Json(ApiResponse::<()>::failure(self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_envelope_shape() {
        let envelope = ApiResponse::<()>::failure(AppError::new(
            AppErrorCode::UserNotFound,
            "Failed to retrieve user information after signing in.",
        ));
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "error": {
                    "code": "UserNotFound",
                    "message": "Failed to retrieve user information after signing in."
                },
                "data": null
            })
        );
    }

    #[test]
    fn test_success_envelope_shape() {
        let envelope = ApiResponse::success(serde_json::json!({ "ok": true }));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["error"], serde_json::Value::Null);
        assert_eq!(json["data"]["ok"], true);
    }

    #[test]
    fn test_validation_result_conversion() {
        let mut result = ValidationResult::new();
        result.add_error("email", "Invalid email");
        result.add_error("password", "Too short");

        let error = AppError::from(result);
        assert_eq!(error.code, AppErrorCode::ValidationFailed);
        assert_eq!(error.message, "email: Invalid email, password: Too short");
        assert_eq!(error.fields.len(), 2);
    }

    #[test]
    fn test_error_code_serializes_verbatim() {
        for code in [
            AppErrorCode::AuthHeaderMissing,
            AppErrorCode::AuthHeaderMalformed,
            AppErrorCode::UnexpectedAppError,
            AppErrorCode::UnknownError,
        ] {
            assert_eq!(serde_json::to_value(code).unwrap(), code.as_str());
        }
    }

    #[tokio::test]
    async fn test_error_response_status_is_ok() {
        let response = AppError::unknown("Failed to sign in.").into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "UnknownError");
        assert_eq!(json["data"], serde_json::Value::Null);
    }
}
