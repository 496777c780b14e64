// src/auth/validators.rs
//
// Schemas for the sign-in and registration forms. The constructors take a
// message lookup so the same rules serve every locale.

use regex::Regex;
use std::sync::LazyLock;

use crate::common::{FieldSchema, Schema};

pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Characters that satisfy the password special-character rule
pub const SPECIAL_CHARACTERS: &str = " `!@#$%^&*()_+-=\\[]{};':\"|,.<>/?~";

static LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{L}").expect("letter class is a valid pattern"));
static DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{N}").expect("number class is a valid pattern"));

// ============================================================================
// Field builders
// ============================================================================

fn email_field<T: Fn(&str) -> String>(t: &T) -> FieldSchema {
    FieldSchema::new("email").trim().email(t("email-invalid"))
}

fn password_field<T: Fn(&str) -> String>(t: &T) -> FieldSchema {
    FieldSchema::new("password")
        .trim()
        .min_length(PASSWORD_MIN_LENGTH, t("password-min-length"))
        .pattern(&LETTER, t("password-must-contain-letter"))
        .pattern(&DIGIT, t("password-must-contain-digit"))
        .contains_any(SPECIAL_CHARACTERS, t("password-must-contain-special"))
}

// ============================================================================
// Form schemas
// ============================================================================

/// Sign-in form: `email`, `password`
pub fn sign_in_schema<T: Fn(&str) -> String>(t: T) -> Schema {
    Schema::new()
        .field(email_field(&t))
        .field(password_field(&t))
}

/// Registration form: `userName`, `email`, `password`, `confirmPassword`
pub fn sign_up_schema<T: Fn(&str) -> String>(t: T) -> Schema {
    Schema::new()
        .field(
            FieldSchema::new("userName")
                .trim()
                .required(t("username-required")),
        )
        .field(email_field(&t))
        .field(password_field(&t))
        .field(
            FieldSchema::new("confirmPassword")
                .trim()
                .equals_field("password", t("passwords-must-match")),
        )
}
