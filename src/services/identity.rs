// src/services/identity.rs
//
// Identity provider boundary. The sign-in flow only needs two calls
// (session cookie creation, current user lookup); registration adds a third.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::models::{SessionClaims, UserProfile};
use crate::common::config::IdentityConfig;
use crate::common::safe_email_log;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity provider not configured: {0} is missing")]
    NotConfigured(&'static str),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Identity provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Email address already in use")]
    EmailExists,
}

/// Account registration request
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Result of a successful registration
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: UserProfile,
    pub id_token: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchanges an ID token for a session cookie valid for `expires_in`.
    /// `Ok(None)` means the provider answered without a cookie.
    async fn create_session_cookie(
        &self,
        id_token: &str,
        expires_in: Duration,
    ) -> Result<Option<String>, IdentityError>;

    /// Resolves the user owning a session cookie.
    async fn get_current_user(
        &self,
        session_cookie: &str,
    ) -> Result<Option<UserProfile>, IdentityError>;

    async fn sign_up(&self, account: &NewAccount) -> Result<SignUpOutcome, IdentityError>;
}

// ============================================================================
// Identity Toolkit REST client
// ============================================================================

#[derive(Debug, Serialize)]
struct CreateSessionCookieRequest<'a> {
    #[serde(rename = "idToken")]
    id_token: &'a str,
    #[serde(rename = "validDuration")]
    valid_duration: String,
}

#[derive(Debug, Deserialize)]
struct CreateSessionCookieResponse {
    #[serde(rename = "sessionCookie")]
    session_cookie: Option<String>,
}

#[derive(Debug, Serialize)]
struct LookupRequest<'a> {
    #[serde(rename = "localId")]
    local_id: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
struct AccountInfo {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    #[serde(rename = "photoUrl")]
    photo_url: Option<String>,
    #[serde(rename = "emailVerified", default)]
    email_verified: bool,
}

impl From<AccountInfo> for UserProfile {
    fn from(info: AccountInfo) -> Self {
        Self {
            uid: info.local_id,
            email: info.email,
            display_name: info.display_name,
            photo_url: info.photo_url,
            email_verified: info.email_verified,
        }
    }
}

#[derive(Debug, Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(rename = "displayName")]
    display_name: &'a str,
    #[serde(rename = "returnSecureToken")]
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(rename = "idToken")]
    id_token: String,
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Debug, Clone)]
pub struct IdentityToolkitService {
    config: IdentityConfig,
    client: Client,
}

impl IdentityToolkitService {
    pub fn new(config: IdentityConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    fn project_url(&self, action: &str) -> Result<String, IdentityError> {
        let project_id = self
            .config
            .project_id
            .as_deref()
            .ok_or(IdentityError::NotConfigured("IDENTITY_PROJECT_ID"))?;
        Ok(format!(
            "{}/projects/{}{}",
            self.config.api_base,
            urlencoding::encode(project_id),
            action
        ))
    }

    fn admin_request(&self, url: &str) -> Result<RequestBuilder, IdentityError> {
        let access_token = self
            .config
            .access_token
            .as_deref()
            .ok_or(IdentityError::NotConfigured("IDENTITY_ACCESS_TOKEN"))?;
        Ok(self.client.post(url).bearer_auth(access_token))
    }

    async fn rejection(response: Response) -> IdentityError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => envelope.error.message,
            Err(_) => "unreadable error body".to_string(),
        };
        if message.starts_with("EMAIL_EXISTS") {
            return IdentityError::EmailExists;
        }
        IdentityError::Rejected { status, message }
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitService {
    async fn create_session_cookie(
        &self,
        id_token: &str,
        expires_in: Duration,
    ) -> Result<Option<String>, IdentityError> {
        let url = self.project_url(":createSessionCookie")?;
        let body = CreateSessionCookieRequest {
            id_token,
            valid_duration: expires_in.as_secs().to_string(),
        };

        let response = self.admin_request(&url)?.json(&body).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let parsed: CreateSessionCookieResponse = response.json().await?;
        debug!(
            has_cookie = parsed.session_cookie.is_some(),
            "Identity provider answered createSessionCookie"
        );
        Ok(parsed.session_cookie.filter(|c| !c.is_empty()))
    }

    async fn get_current_user(
        &self,
        session_cookie: &str,
    ) -> Result<Option<UserProfile>, IdentityError> {
        let Some(uid) = session_uid(session_cookie) else {
            warn!("Session cookie carries no usable subject");
            return Ok(None);
        };

        let url = self.project_url("/accounts:lookup")?;
        let body = LookupRequest {
            local_id: [uid.as_str()],
        };

        let response = self.admin_request(&url)?.json(&body).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let parsed: LookupResponse = response.json().await?;
        Ok(parsed.users.into_iter().next().map(UserProfile::from))
    }

    async fn sign_up(&self, account: &NewAccount) -> Result<SignUpOutcome, IdentityError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(IdentityError::NotConfigured("IDENTITY_API_KEY"))?;
        let url = format!("{}/accounts:signUp", self.config.api_base);
        let body = SignUpRequest {
            email: &account.email,
            password: &account.password,
            display_name: &account.display_name,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let parsed: SignUpResponse = response.json().await?;
        debug!(
            user_id = %parsed.local_id,
            email = %safe_email_log(&account.email),
            "Identity provider created account"
        );

        Ok(SignUpOutcome {
            user: UserProfile {
                uid: parsed.local_id,
                email: parsed.email.or_else(|| Some(account.email.clone())),
                display_name: parsed
                    .display_name
                    .or_else(|| Some(account.display_name.clone())),
                photo_url: None,
                email_verified: false,
            },
            id_token: parsed.id_token,
        })
    }
}

// ---- Helper Functions ----

/// Reads the subject of an unexpired session cookie.
///
/// The signature is not checked; verification belongs to the provider.
pub fn session_uid(session_cookie: &str) -> Option<String> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.algorithms = vec![Algorithm::RS256, Algorithm::HS256];
    validation.insecure_disable_signature_validation();

    decode::<SessionClaims>(session_cookie, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims.sub)
        .filter(|sub| !sub.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn cookie_for(sub: &str, exp: usize) -> String {
        let claims = SessionClaims {
            sub: sub.to_string(),
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"provider-secret"),
        )
        .expect("Failed to encode token")
    }

    #[test]
    fn test_session_uid_reads_subject() {
        let cookie = cookie_for("uid-123", 9999999999);
        assert_eq!(session_uid(&cookie), Some("uid-123".to_string()));
    }

    #[test]
    fn test_session_uid_rejects_expired_cookie() {
        let cookie = cookie_for("uid-123", 1000);
        assert_eq!(session_uid(&cookie), None);
    }

    #[test]
    fn test_session_uid_rejects_garbage() {
        assert_eq!(session_uid("not-a-jwt"), None);
        assert_eq!(session_uid(""), None);
    }

    #[test]
    fn test_account_info_maps_to_profile() {
        let info: AccountInfo = serde_json::from_value(serde_json::json!({
            "localId": "abc",
            "email": "user@example.com",
            "displayName": "User",
            "photoUrl": "https://example.com/a.png",
            "emailVerified": true
        }))
        .unwrap();

        let profile = UserProfile::from(info);
        assert_eq!(profile.uid, "abc");
        assert_eq!(profile.display_name.as_deref(), Some("User"));
        assert!(profile.email_verified);
    }

    #[tokio::test]
    async fn test_unconfigured_service_reports_missing_setting() {
        let service = IdentityToolkitService::new(IdentityConfig::default());

        let err = service
            .create_session_cookie("token", Duration::from_secs(300))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IdentityError::NotConfigured("IDENTITY_PROJECT_ID")
        ));

        let err = service
            .sign_up(&NewAccount {
                email: "user@example.com".to_string(),
                password: "abcd1234!".to_string(),
                display_name: "User".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::NotConfigured("IDENTITY_API_KEY")));
    }

    #[test]
    fn test_project_url_encodes_project_id() {
        let service = IdentityToolkitService::new(IdentityConfig {
            project_id: Some("my project".to_string()),
            ..IdentityConfig::default()
        });
        assert_eq!(
            service.project_url(":createSessionCookie").unwrap(),
            "https://identitytoolkit.googleapis.com/v1/projects/my%20project:createSessionCookie"
        );
    }
}
