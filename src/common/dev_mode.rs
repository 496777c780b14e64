// src/common/dev_mode.rs
//! Development mode configuration and utilities
//! Replaces the identity provider with an in-process stand-in for local work

use async_trait::async_trait;
use std::env;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::models::UserProfile;
use crate::services::{IdentityError, IdentityProvider, NewAccount, SignUpOutcome};

const DEV_SESSION_PREFIX: &str = "dev-session-";

#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub enabled: bool,
    pub user_email: String,
    pub user_name: String,
}

impl DevModeConfig {
    pub fn from_env() -> Self {
        let enabled = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        let user_email = env::var("DEV_USER_EMAIL").unwrap_or_else(|_| "dev@test.com".to_string());

        let user_name = env::var("DEV_USER_NAME").unwrap_or_else(|_| "Dev User".to_string());

        Self {
            enabled,
            user_email,
            user_name,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Create a dev user for testing
    /// Uses a fixed UID to ensure consistency across requests
    pub fn create_dev_user(&self) -> UserProfile {
        UserProfile {
            uid: "00000000-0000-0000-0000-000000000001".to_string(),
            email: Some(self.user_email.clone()),
            display_name: Some(self.user_name.clone()),
            photo_url: None,
            email_verified: true,
        }
    }
}

/// Identity provider used in dev mode: any non-empty token signs in as the dev user
#[derive(Debug, Clone)]
pub struct DevIdentityProvider {
    user: UserProfile,
}

impl DevIdentityProvider {
    pub fn new(config: &DevModeConfig) -> Self {
        Self {
            user: config.create_dev_user(),
        }
    }
}

#[async_trait]
impl IdentityProvider for DevIdentityProvider {
    async fn create_session_cookie(
        &self,
        id_token: &str,
        _expires_in: Duration,
    ) -> Result<Option<String>, IdentityError> {
        if id_token.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("{}{}", DEV_SESSION_PREFIX, Uuid::new_v4())))
    }

    async fn get_current_user(
        &self,
        session_cookie: &str,
    ) -> Result<Option<UserProfile>, IdentityError> {
        Ok(session_cookie
            .starts_with(DEV_SESSION_PREFIX)
            .then(|| self.user.clone()))
    }

    async fn sign_up(&self, account: &NewAccount) -> Result<SignUpOutcome, IdentityError> {
        Ok(SignUpOutcome {
            user: UserProfile {
                uid: Uuid::new_v4().to_string(),
                email: Some(account.email.clone()),
                display_name: Some(account.display_name.clone()),
                photo_url: None,
                email_verified: false,
            },
            id_token: format!("dev-id-token-{}", Uuid::new_v4()),
        })
    }
}

/// Print dev mode status on startup
pub fn print_dev_mode_status(config: &DevModeConfig) {
    if config.enabled {
        println!("⚠️  🔓 DEV MODE ENABLED 🔓 ⚠️");
        println!("   Identity provider replaced by the dev stand-in");
        println!("   Dev User: {} ({})", config.user_name, config.user_email);
        println!("   ⚠️  DO NOT USE IN PRODUCTION ⚠️");
        println!();
    } else {
        println!("🔒 Identity provider: Identity Toolkit REST API");
    }
}

/// CLI argument parsing for dev mode
pub fn parse_dev_mode_args<I: IntoIterator<Item = String>>(args: I) -> Option<bool> {
    for arg in args {
        match arg.as_str() {
            "--dev" | "--dev-mode" => return Some(true),
            "--no-dev" | "--prod" | "--production" => return Some(false),
            _ => {}
        }
    }

    None
}

/// Override dev mode from CLI args
pub fn apply_cli_override(mut config: DevModeConfig) -> DevModeConfig {
    if let Some(cli_dev_mode) = parse_dev_mode_args(env::args()) {
        println!("🔧 CLI override: DEV_MODE = {}", cli_dev_mode);
        config.enabled = cli_dev_mode;
    }

    config
}
