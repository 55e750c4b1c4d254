//! Domain layer containing token claims, roles, scopes and key material types.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
