// Common module - shared types and utilities across all modules

pub mod config;
pub mod cookies;
pub mod dev_mode;
pub mod error;
pub mod helpers;
pub mod state;
pub mod validation;

// Re-export commonly used types for convenience
pub use error::{ApiResponse, AppError, AppErrorCode};
pub use helpers::{escape_html, safe_email_log, safe_token_log};
pub use state::AppState;
pub use validation::{FieldSchema, FormFields, Schema, Validator};
