//! # Infrastructure Layer
//!
//! Concrete adapters for the ports defined in `tw_core`:
//!
//! - **Cache**: Redis client and the [`RevocationStore`](tw_core::RevocationStore)
//!   backed by it
//! - **Secrets**: [`SecretSource`](tw_core::SecretSource) implementations
//!   reading signing keys from HashiCorp Vault or PEM files on disk
//! - **Credentials**: HTTP client for the user service's credential check

/// Cache module - Redis client and revocation store
pub mod cache;

/// Secret sources for signing keys
pub mod secrets;

/// Credential validation against the user service
pub mod credentials;

pub use cache::{RedisClient, RedisRevocationStore};
pub use credentials::HttpCredentialValidator;
pub use secrets::{build_secret_source, FileSecretSource, VaultSecretSource};

use tw_core::errors::{DomainError, KeyError};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Secret backend returned something unusable
    #[error("Secret error: {0}")]
    Secret(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Cache(_) => DomainError::dependency_unavailable("revocation store"),
            InfrastructureError::Http(_) => DomainError::dependency_unavailable("http collaborator"),
            InfrastructureError::Secret(message) => {
                DomainError::Key(KeyError::SourceUnavailable { message })
            }
            InfrastructureError::Config(message) | InfrastructureError::General(message) => {
                DomainError::Internal { message }
            }
        }
    }
}

impl From<InfrastructureError> for KeyError {
    fn from(error: InfrastructureError) -> Self {
        KeyError::SourceUnavailable {
            message: error.to_string(),
        }
    }
}
