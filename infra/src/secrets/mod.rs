//! Signing key sources
//!
//! - [`VaultSecretSource`] - HashiCorp Vault KV over HTTP
//! - [`FileSecretSource`] - PEM files on local disk

pub mod file;
pub mod vault;

#[cfg(test)]
mod tests;

pub use file::FileSecretSource;
pub use vault::VaultSecretSource;

use std::sync::Arc;
use tracing::info;

use tw_core::services::keys::SecretSource;
use tw_shared::config::{KeyConfig, KeySourceKind};

use crate::InfrastructureError;

/// Builds the secret source selected by `KEY_SOURCE`
pub fn build_secret_source(
    config: &KeyConfig,
) -> Result<Arc<dyn SecretSource>, InfrastructureError> {
    let source: Arc<dyn SecretSource> = match config.source {
        KeySourceKind::Vault => Arc::new(VaultSecretSource::from_config(config)?),
        KeySourceKind::File => Arc::new(FileSecretSource::from_config(config)),
    };

    info!(source = source.name(), "Secret source configured");
    Ok(source)
}
