//! Tests for auth module
//!
//! These tests drive the auth router end to end against a scripted identity
//! provider:
//! - Sign-in envelope for every failure branch and the success path
//! - Session cookie attributes
//! - Sign-up and form validation with localized messages

#[cfg(test)]
mod tests {
    use super::super::models::UserProfile;
    use super::super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::extract::Extension;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::common::config::{AppConfig, Environment};
    use crate::common::AppState;
    use crate::i18n::Catalog;
    use crate::services::{IdentityError, IdentityProvider, NewAccount, SignUpOutcome};

    /// Identity provider with canned answers that records how it was called
    #[derive(Default)]
    struct MockIdentity {
        cookie: Option<String>,
        user: Option<UserProfile>,
        fail_cookie: bool,
        email_taken: bool,
        cookie_calls: AtomicUsize,
        user_calls: AtomicUsize,
        last_expires_in: std::sync::Mutex<Option<Duration>>,
        last_token: std::sync::Mutex<Option<String>>,
    }

    #[async_trait]
    impl IdentityProvider for MockIdentity {
        async fn create_session_cookie(
            &self,
            id_token: &str,
            expires_in: Duration,
        ) -> Result<Option<String>, IdentityError> {
            self.cookie_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_expires_in.lock().unwrap() = Some(expires_in);
            *self.last_token.lock().unwrap() = Some(id_token.to_string());
            if self.fail_cookie {
                return Err(IdentityError::Rejected {
                    status: 400,
                    message: "INVALID_ID_TOKEN".to_string(),
                });
            }
            Ok(self.cookie.clone())
        }

        async fn get_current_user(
            &self,
            _session_cookie: &str,
        ) -> Result<Option<UserProfile>, IdentityError> {
            self.user_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.user.clone())
        }

        async fn sign_up(&self, account: &NewAccount) -> Result<SignUpOutcome, IdentityError> {
            if self.email_taken {
                return Err(IdentityError::EmailExists);
            }
            Ok(SignUpOutcome {
                user: UserProfile {
                    uid: "new-user".to_string(),
                    email: Some(account.email.clone()),
                    display_name: Some(account.display_name.clone()),
                    photo_url: None,
                    email_verified: false,
                },
                id_token: "fresh-id-token".to_string(),
            })
        }
    }

    fn test_user() -> UserProfile {
        UserProfile {
            uid: "user-123".to_string(),
            email: Some("test@example.com".to_string()),
            display_name: Some("Test User".to_string()),
            photo_url: None,
            email_verified: true,
        }
    }

    fn happy_identity() -> MockIdentity {
        MockIdentity {
            cookie: Some("session-cookie-value".to_string()),
            user: Some(test_user()),
            ..MockIdentity::default()
        }
    }

    fn router_with(identity: Arc<MockIdentity>, config: AppConfig) -> axum::Router {
        let state = AppState::new(config, identity, Catalog::load().unwrap());
        auth_routes().layer(Extension(state))
    }

    async fn sign_in_request(router: axum::Router, auth: Option<&str>) -> Response {
        let mut builder = Request::builder().method("POST").uri("/api/auth/sign-in");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_json(router: axum::Router, uri: &str, body: serde_json::Value) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        router.oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    // ------------------------------------------------------------------
    // Sign-in
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_sign_in_success() {
        let identity = Arc::new(happy_identity());
        let router = router_with(identity.clone(), AppConfig::default());

        let response = sign_in_request(router, Some("Bearer id-token-1")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let cookies: Vec<_> = response.headers().get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 1);
        let cookie = cookies[0].to_str().unwrap().to_string();
        assert!(cookie.starts_with("session=session-cookie-value"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=432000"));
        assert!(!cookie.contains("Secure"));

        let json = json_body(response).await;
        assert_eq!(json["error"], serde_json::Value::Null);
        assert_eq!(json["data"]["user"], serde_json::to_value(test_user()).unwrap());

        assert_eq!(identity.last_token.lock().unwrap().as_deref(), Some("id-token-1"));
    }

    #[tokio::test]
    async fn test_sign_in_passes_max_age_in_millis() {
        let identity = Arc::new(happy_identity());
        let mut config = AppConfig::default();
        config.session_cookie.max_age_seconds = 600;
        let router = router_with(identity.clone(), config);

        sign_in_request(router, Some("Bearer id-token")).await;

        let expires_in = identity.last_expires_in.lock().unwrap().unwrap();
        assert_eq!(expires_in.as_millis(), 600_000);
    }

    #[tokio::test]
    async fn test_sign_in_secure_cookie_in_production() {
        let mut config = AppConfig::default();
        config.environment = Environment::Production;
        config.session_cookie.name = "__session".to_string();
        let router = router_with(Arc::new(happy_identity()), config);

        let response = sign_in_request(router, Some("Bearer id-token")).await;
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("__session="));
        assert!(cookie.contains("; Secure"));
    }

    #[tokio::test]
    async fn test_sign_in_missing_header() {
        let identity = Arc::new(happy_identity());
        let router = router_with(identity.clone(), AppConfig::default());

        let response = sign_in_request(router, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());

        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "AuthHeaderMissing");
        assert_eq!(json["data"], serde_json::Value::Null);
        assert_eq!(identity.cookie_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sign_in_malformed_header() {
        let router = router_with(Arc::new(happy_identity()), AppConfig::default());

        let response = sign_in_request(router, Some("Basic dXNlcjpwYXNz")).await;
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "AuthHeaderMalformed");
        assert_eq!(json["data"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_sign_in_without_cookie_is_unexpected_error() {
        let identity = Arc::new(MockIdentity {
            cookie: None,
            user: Some(test_user()),
            ..MockIdentity::default()
        });
        let router = router_with(identity.clone(), AppConfig::default());

        let response = sign_in_request(router, Some("Bearer id-token")).await;
        assert!(response.headers().get(header::SET_COOKIE).is_none());

        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "UnexpectedAppError");
        assert_eq!(json["error"]["message"], "Failed to create session cookie.");
        assert_eq!(json["data"], serde_json::Value::Null);
        assert_eq!(identity.user_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sign_in_empty_cookie_is_unexpected_error() {
        let identity = Arc::new(MockIdentity {
            cookie: Some(String::new()),
            user: Some(test_user()),
            ..MockIdentity::default()
        });
        let router = router_with(identity, AppConfig::default());

        let json = json_body(sign_in_request(router, Some("Bearer id-token")).await).await;
        assert_eq!(json["error"]["code"], "UnexpectedAppError");
    }

    #[tokio::test]
    async fn test_sign_in_without_user_is_user_not_found() {
        let identity = Arc::new(MockIdentity {
            cookie: Some("session-cookie-value".to_string()),
            user: None,
            ..MockIdentity::default()
        });
        let router = router_with(identity.clone(), AppConfig::default());

        let response = sign_in_request(router, Some("Bearer id-token")).await;
        assert!(response.headers().get(header::SET_COOKIE).is_none());

        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "UserNotFound");
        assert_eq!(json["data"], serde_json::Value::Null);
        assert_eq!(identity.user_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sign_in_provider_failure_is_unknown_error() {
        let identity = Arc::new(MockIdentity {
            fail_cookie: true,
            ..happy_identity()
        });
        let router = router_with(identity.clone(), AppConfig::default());

        let response = sign_in_request(router, Some("Bearer id-token")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "UnknownError");
        assert_eq!(json["error"]["message"], "Failed to sign in.");
        assert_eq!(identity.user_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sign_in_twice_issues_two_cookies() {
        let identity = Arc::new(happy_identity());
        let router = router_with(identity.clone(), AppConfig::default());

        sign_in_request(router.clone(), Some("Bearer id-token")).await;
        sign_in_request(router, Some("Bearer id-token")).await;

        assert_eq!(identity.cookie_calls.load(Ordering::SeqCst), 2);
    }

    // ------------------------------------------------------------------
    // Sign-up
    // ------------------------------------------------------------------

    fn sign_up_body(confirm: &str) -> serde_json::Value {
        serde_json::json!({
            "userName": " Neo ",
            "email": "neo@example.com",
            "password": "abcd1234!",
            "confirmPassword": confirm
        })
    }

    #[tokio::test]
    async fn test_sign_up_success() {
        let router = router_with(Arc::new(MockIdentity::default()), AppConfig::default());

        let response = post_json(router, "/api/auth/sign-up", sign_up_body("abcd1234!")).await;
        let json = json_body(response).await;

        assert_eq!(json["error"], serde_json::Value::Null);
        assert_eq!(json["data"]["user"]["displayName"], "Neo");
        assert_eq!(json["data"]["idToken"], "fresh-id-token");
    }

    #[tokio::test]
    async fn test_sign_up_password_mismatch_is_localized() {
        let router = router_with(Arc::new(MockIdentity::default()), AppConfig::default());

        let response = post_json(
            router,
            "/api/auth/sign-up?locale=ru",
            sign_up_body("abcd1234?"),
        )
        .await;
        let json = json_body(response).await;

        assert_eq!(json["error"]["code"], "ValidationFailed");
        assert_eq!(json["error"]["fields"][0]["field"], "confirmPassword");
        assert_eq!(json["error"]["fields"][0]["message"], "Пароли не совпадают.");
        assert_eq!(json["data"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_sign_up_email_taken() {
        let identity = Arc::new(MockIdentity {
            email_taken: true,
            ..MockIdentity::default()
        });
        let router = router_with(identity, AppConfig::default());

        let response = post_json(router, "/api/auth/sign-up", sign_up_body("abcd1234!")).await;
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "EmailAlreadyInUse");
    }

    #[tokio::test]
    async fn test_sign_up_rejects_non_json_body() {
        let router = router_with(Arc::new(MockIdentity::default()), AppConfig::default());
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/sign-up")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("hello"))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "ValidationFailed");
    }

    // ------------------------------------------------------------------
    // Form validation
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_validate_sign_in_form() {
        let router = router_with(Arc::new(MockIdentity::default()), AppConfig::default());

        let response = post_json(
            router.clone(),
            "/api/forms/sign-in/validate",
            serde_json::json!({ "email": "user@example.com", "password": "abcd1234!" }),
        )
        .await;
        let json = json_body(response).await;
        assert_eq!(json["data"]["valid"], true);

        let response = post_json(
            router,
            "/api/forms/sign-in/validate",
            serde_json::json!({ "email": "user@example.com", "password": "abc12345" }),
        )
        .await;
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "ValidationFailed");
        assert_eq!(
            json["error"]["fields"],
            serde_json::json!([{
                "field": "password",
                "message": "Password must contain at least one special character."
            }])
        );
    }

    #[tokio::test]
    async fn test_validate_rejects_padded_email() {
        let router = router_with(Arc::new(MockIdentity::default()), AppConfig::default());

        let response = post_json(
            router,
            "/api/forms/sign-in/validate",
            serde_json::json!({ "email": "  user@example.com  ", "password": "abcd123 " }),
        )
        .await;
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "ValidationFailed");
        assert_eq!(
            json["error"]["fields"],
            serde_json::json!([{
                "field": "email",
                "message": "Please enter a valid email address."
            }])
        );
    }

    #[tokio::test]
    async fn test_validate_uses_accept_language() {
        let router = router_with(Arc::new(MockIdentity::default()), AppConfig::default());
        let request = Request::builder()
            .method("POST")
            .uri("/api/forms/sign-in/validate")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT_LANGUAGE, "ru-RU,ru;q=0.9,en;q=0.5")
            .body(Body::from(
                serde_json::json!({ "email": "bad", "password": "abcd1234!" }).to_string(),
            ))
            .unwrap();

        let json = json_body(router.oneshot(request).await.unwrap()).await;
        assert_eq!(
            json["error"]["fields"][0]["message"],
            "Введите корректный адрес электронной почты."
        );
    }

    #[tokio::test]
    async fn test_validate_unknown_form() {
        let router = router_with(Arc::new(MockIdentity::default()), AppConfig::default());

        let response = post_json(router, "/api/forms/checkout/validate", serde_json::json!({})).await;
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "UnknownError");
        assert_eq!(json["error"]["message"], "Unknown form.");
    }
}
