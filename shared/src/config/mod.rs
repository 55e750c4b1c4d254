//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token lifetimes and signing key source configuration
//! - `cache` - Redis configuration for the revocation store
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server configuration
//! - `services` - Remote collaborator endpoints (user service)

pub mod auth;
pub mod cache;
pub mod environment;
pub mod server;
pub mod services;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Re-export commonly used types
pub use auth::{AuthConfig, JwtConfig, KeyConfig, KeySourceKind};
pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::{CorsConfig, ServerConfig};
pub use services::CredentialServiceConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Cross-origin settings for browser clients
    #[serde(default)]
    pub cors: CorsConfig,

    /// Token and key configuration
    pub auth: AuthConfig,

    /// Redis configuration for revocation records
    pub cache: CacheConfig,

    /// User service endpoint used for credential checks
    #[serde(default)]
    pub credentials: CredentialServiceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            cors: CorsConfig::default(),
            auth: AuthConfig::default(),
            cache: CacheConfig::default(),
            credentials: CredentialServiceConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Missing or unparsable variables fall back to their defaults.
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let mut logging = LoggingConfig::for_environment(environment);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging.level = level;
        }

        Self {
            environment,
            server: ServerConfig::from_env(),
            cors: CorsConfig::from_env(),
            auth: AuthConfig::from_env(),
            cache: CacheConfig::from_env(),
            credentials: CredentialServiceConfig::from_env(),
            logging,
        }
    }

    /// Verbose error bodies are only returned outside production
    pub fn expose_error_details(&self) -> bool {
        self.environment.is_debug()
    }
}

/// Reads and parses an environment variable, falling back to `default`
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Reads an optional, non-empty environment variable
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
