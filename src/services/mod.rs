// src/services/mod.rs
//
// Clients for the external services the application depends on

pub mod identity;

// Re-export commonly used types for convenience
pub use identity::{
    IdentityError, IdentityProvider, IdentityToolkitService, NewAccount, SignUpOutcome,
};
