// src/common/config.rs
//! Application configuration loaded from environment variables

use std::env;
use std::time::Duration;
use tracing::warn;

/// Shortest session the identity provider accepts
pub const MIN_SESSION_SECONDS: u64 = 5 * 60;
/// Longest session the identity provider accepts
pub const MAX_SESSION_SECONDS: u64 = 14 * 24 * 60 * 60;

pub const DEFAULT_SESSION_COOKIE_NAME: &str = "session";
pub const DEFAULT_SESSION_MAX_AGE_SECONDS: u64 = 5 * 24 * 60 * 60;
pub const DEFAULT_IDENTITY_API_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Session cookie settings
#[derive(Debug, Clone)]
pub struct SessionCookieConfig {
    pub name: String,
    pub max_age_seconds: u64,
}

impl SessionCookieConfig {
    /// Session lifetime handed to the identity provider (max-age in milliseconds)
    pub fn expires_in(&self) -> Duration {
        Duration::from_millis(self.max_age_seconds * 1000)
    }
}

impl Default for SessionCookieConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
            max_age_seconds: DEFAULT_SESSION_MAX_AGE_SECONDS,
        }
    }
}

/// Identity provider REST settings
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub api_base: String,
    pub project_id: Option<String>,
    pub access_token: Option<String>,
    pub api_key: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_IDENTITY_API_BASE.to_string(),
            project_id: None,
            access_token: None,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: Environment,
    pub session_cookie: SessionCookieConfig,
    pub identity: IdentityConfig,
    pub default_locale: String,
    pub cors_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            environment: Environment::Development,
            session_cookie: SessionCookieConfig::default(),
            identity: IdentityConfig::default(),
            default_locale: "en".to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:3001".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(port) = env::var("PORT") {
            match port.parse::<u16>() {
                Ok(val) => config.port = val,
                Err(_) => warn!(value = %port, "Ignoring invalid PORT"),
            }
        }

        // APP_ENV - "production" enables Secure cookies
        if let Ok(app_env) = env::var("APP_ENV") {
            config.environment = Environment::parse(&app_env);
        }

        if let Ok(name) = env::var("SESSION_COOKIE_NAME") {
            let name = name.trim();
            if is_valid_cookie_name(name) {
                config.session_cookie.name = name.to_string();
            } else {
                warn!(value = %name, "Ignoring invalid SESSION_COOKIE_NAME");
            }
        }

        if let Ok(max_age) = env::var("SESSION_COOKIE_MAX_AGE_SECONDS") {
            match max_age.parse::<u64>() {
                Ok(val) => config.session_cookie.max_age_seconds = clamp_session_seconds(val),
                Err(_) => warn!(value = %max_age, "Ignoring invalid SESSION_COOKIE_MAX_AGE_SECONDS"),
            }
        }

        if let Ok(locale) = env::var("DEFAULT_LOCALE") {
            config.default_locale = locale.trim().to_lowercase();
        }

        // CORS_ORIGINS - comma-separated list of allowed origins
        if let Ok(origins) = env::var("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(base) = env::var("IDENTITY_API_BASE") {
            config.identity.api_base = base.trim_end_matches('/').to_string();
        }
        config.identity.project_id = non_empty_var("IDENTITY_PROJECT_ID");
        config.identity.access_token = non_empty_var("IDENTITY_ACCESS_TOKEN");
        config.identity.api_key = non_empty_var("IDENTITY_API_KEY");

        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Keeps a session lifetime inside the range the identity provider accepts
pub fn clamp_session_seconds(seconds: u64) -> u64 {
    let clamped = seconds.clamp(MIN_SESSION_SECONDS, MAX_SESSION_SECONDS);
    if clamped != seconds {
        warn!(
            requested = seconds,
            applied = clamped,
            "Session max-age outside provider limits, clamping"
        );
    }
    clamped
}

/// Cookie names are RFC 6265 tokens
fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| {
            c.is_ascii_graphic()
                && !matches!(
                    c,
                    '(' | ')' | '<' | '>' | '@' | ',' | ';' | ':' | '\\' | '"' | '/' | '['
                        | ']' | '?' | '=' | '{' | '}'
                )
        })
}
