//! Authentication data models

use serde::{Deserialize, Serialize};

use crate::common::FormFields;

/// Claims read from a provider-issued session cookie
#[derive(Serialize, Deserialize, Debug)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: usize,
}

/// Profile of the signed-in user as reported by the identity provider
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub uid: String,
    pub email: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(rename = "emailVerified", default)]
    pub email_verified: bool,
}

/// `data` payload of a successful sign-in
#[derive(Serialize, Debug)]
pub struct SignInData {
    pub user: UserProfile,
}

/// `data` payload of a successful sign-up
#[derive(Serialize, Debug)]
pub struct SignUpData {
    pub user: UserProfile,
    #[serde(rename = "idToken")]
    pub id_token: String,
}

/// `data` payload of a form check that passed
#[derive(Serialize, Debug)]
pub struct FormCheck {
    pub valid: bool,
}

/// Sign-in form values
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

/// Registration form values
#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SignUpForm {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl FormFields for SignInForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            _ => None,
        }
    }
}

impl FormFields for SignUpForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "userName" => Some(&self.user_name),
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            "confirmPassword" => Some(&self.confirm_password),
            _ => None,
        }
    }
}

/// Optional `?locale=` override
#[derive(Deserialize, Debug, Default)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}
