//! API-level configuration

use tw_shared::config::AppConfig;

/// Error response configuration options
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorConfig {
    /// Return the specific failure reason instead of a flattened
    /// "unauthorized" for token and credential errors
    pub expose_details: bool,
}

impl ErrorConfig {
    pub fn verbose() -> Self {
        Self {
            expose_details: true,
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            expose_details: config.expose_error_details(),
        }
    }
}

/// Loads `.env` (if present) and then the environment
pub fn load() -> AppConfig {
    dotenvy::dotenv().ok();
    AppConfig::from_env()
}
