//! Shared utilities and common types for the TokenWarden server
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types (JWT policy, key source, Redis, HTTP server, logging)
//! - Error response structures

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, CredentialServiceConfig, Environment, JwtConfig,
    CorsConfig, KeyConfig, KeySourceKind, LogFormat, LoggingConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse, IntoErrorResponse};
