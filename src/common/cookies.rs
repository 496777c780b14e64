// src/common/cookies.rs
//! `Set-Cookie` header construction for the session cookie

use axum::http::header::InvalidHeaderValue;
use axum::http::HeaderValue;
use chrono::{DateTime, Duration, Utc};

/// A cookie and its attributes, rendered as one `Set-Cookie` value
#[derive(Debug, Clone)]
pub struct ResponseCookie {
    pub name: String,
    pub value: String,
    pub max_age_seconds: Option<u64>,
    pub path: Option<String>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site_strict: bool,
}

impl ResponseCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age_seconds: None,
            path: None,
            http_only: false,
            secure: false,
            same_site_strict: false,
        }
    }

    /// Session cookie attributes: HttpOnly, SameSite=Strict, Path=/,
    /// Secure only when serving production traffic.
    pub fn session(
        name: impl Into<String>,
        value: impl Into<String>,
        max_age_seconds: u64,
        secure: bool,
    ) -> Self {
        Self::new(name, value)
            .max_age(max_age_seconds)
            .path("/")
            .http_only(true)
            .secure(secure)
            .same_site_strict(true)
    }

    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age_seconds = Some(seconds);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn same_site_strict(mut self, strict: bool) -> Self {
        self.same_site_strict = strict;
        self
    }

    /// Renders the cookie with `Expires` computed from `now`
    pub fn render_at(&self, now: DateTime<Utc>) -> String {
        let mut out = format!("{}={}", self.name, self.value);

        if let Some(max_age) = self.max_age_seconds {
            out.push_str(&format!("; Max-Age={}", max_age));
            let seconds = i64::try_from(max_age).unwrap_or(i64::MAX);
            let expires = Duration::try_seconds(seconds).and_then(|d| now.checked_add_signed(d));
            if let Some(expires) = expires {
                out.push_str(&format!(
                    "; Expires={}",
                    expires.format("%a, %d %b %Y %H:%M:%S GMT")
                ));
            }
        }
        if let Some(path) = &self.path {
            out.push_str(&format!("; Path={}", path));
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if self.same_site_strict {
            out.push_str("; SameSite=Strict");
        }

        out
    }

    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.render_at(Utc::now()))
    }
}
