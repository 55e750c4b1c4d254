//! Remote collaborator configuration

use serde::{Deserialize, Serialize};

use super::{env_opt, env_or};

/// User service endpoint used to check email/password pairs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialServiceConfig {
    /// Base URL of the user service
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for CredentialServiceConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://user-service"),
            timeout: 3,
        }
    }
}

impl CredentialServiceConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_opt("USER_SERVICE_URL").unwrap_or(defaults.base_url),
            timeout: env_or("USER_SERVICE_TIMEOUT", defaults.timeout),
        }
    }

    /// Full URL of the credential validation endpoint
    pub fn validate_url(&self) -> String {
        format!("{}/validate", self.base_url.trim_end_matches('/'))
    }
}
