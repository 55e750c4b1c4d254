//! Token lifetime and signing key configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{env_opt, env_or};

/// JWT lifetime configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Access token expiry time in seconds
    pub access_token_expiry: u64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
        }
    }
}

impl JwtConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            access_token_expiry: env_or("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_or("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry),
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: u64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: u64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }
}

/// Where signing keys are loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySourceKind {
    /// HashiCorp Vault KV secrets
    Vault,
    /// PEM files on local disk
    File,
}

impl std::str::FromStr for KeySourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vault" => Ok(KeySourceKind::Vault),
            "file" | "files" => Ok(KeySourceKind::File),
            _ => Err(format!("Invalid key source: {}", s)),
        }
    }
}

/// Signing key source and refresh configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeyConfig {
    /// Which secret source to read keys from
    pub source: KeySourceKind,

    /// Vault server address
    #[serde(default)]
    pub vault_addr: Option<String>,

    /// Vault access token
    #[serde(default, skip_serializing)]
    pub vault_token: Option<String>,

    /// Vault KV mount holding `private_key` and `public_keys`
    pub vault_mount: String,

    /// Path to the active PEM private key (file source)
    pub private_key_path: PathBuf,

    /// Key identifier of the active private key (file source)
    pub active_kid: String,

    /// Directory of `<kid>.pem` public keys (file source)
    pub public_keys_dir: PathBuf,

    /// Seconds between scheduled key refreshes
    pub refresh_interval: u64,

    /// Seconds to wait before the single retry after a failed refresh
    pub refresh_retry_backoff: u64,

    /// Upper bound in seconds for one secret source round-trip
    pub source_timeout: u64,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            source: KeySourceKind::File,
            vault_addr: None,
            vault_token: None,
            vault_mount: String::from("jwt_keys"),
            private_key_path: PathBuf::from("keys/jwt_private_key.pem"),
            active_kid: String::from("default"),
            public_keys_dir: PathBuf::from("keys/public"),
            refresh_interval: 3600,    // 1 hour
            refresh_retry_backoff: 60, // 1 minute
            source_timeout: 3,
        }
    }
}

impl KeyConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            source: env_or("KEY_SOURCE", defaults.source),
            vault_addr: env_opt("VAULT_ADDR"),
            vault_token: env_opt("VAULT_TOKEN"),
            vault_mount: env_opt("VAULT_MOUNT").unwrap_or(defaults.vault_mount),
            private_key_path: env_opt("JWT_PRIVATE_KEY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.private_key_path),
            active_kid: env_opt("JWT_ACTIVE_KID").unwrap_or(defaults.active_kid),
            public_keys_dir: env_opt("JWT_PUBLIC_KEYS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_keys_dir),
            refresh_interval: env_or("KEY_REFRESH_INTERVAL", defaults.refresh_interval),
            refresh_retry_backoff: env_or(
                "KEY_REFRESH_RETRY_BACKOFF",
                defaults.refresh_retry_backoff,
            ),
            source_timeout: env_or("KEY_SOURCE_TIMEOUT", defaults.source_timeout),
        }
    }

    /// Use Vault as the key source
    pub fn with_vault(mut self, addr: impl Into<String>, token: impl Into<String>) -> Self {
        self.source = KeySourceKind::Vault;
        self.vault_addr = Some(addr.into());
        self.vault_token = Some(token.into());
        self
    }

    /// Set the refresh cadence in seconds
    pub fn with_refresh_interval(mut self, seconds: u64) -> Self {
        self.refresh_interval = seconds;
        self
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Signing key configuration
    pub keys: KeyConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            keys: KeyConfig::from_env(),
        }
    }
}
