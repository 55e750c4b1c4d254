//! PEM files on local disk
//!
//! Rotation is done by replacing files: the next refresh picks up whatever
//! the private key file and the public key directory hold at that moment.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use tw_core::domain::entities::keys::SigningKeyPem;
use tw_core::errors::KeyError;
use tw_core::services::keys::SecretSource;
use tw_shared::config::KeyConfig;

/// [`SecretSource`] over a private key file and a directory of `<kid>.pem`
/// public keys
#[derive(Debug, Clone)]
pub struct FileSecretSource {
    private_key_path: PathBuf,
    active_kid: String,
    public_keys_dir: PathBuf,
}

impl FileSecretSource {
    pub fn new(
        private_key_path: impl Into<PathBuf>,
        active_kid: impl Into<String>,
        public_keys_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            private_key_path: private_key_path.into(),
            active_kid: active_kid.into(),
            public_keys_dir: public_keys_dir.into(),
        }
    }

    pub fn from_config(config: &KeyConfig) -> Self {
        Self::new(
            config.private_key_path.clone(),
            config.active_kid.clone(),
            config.public_keys_dir.clone(),
        )
    }
}

async fn read_pem(path: &Path) -> Result<String, KeyError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| KeyError::SourceUnavailable {
            message: format!("cannot read {}: {}", path.display(), e),
        })
}

#[async_trait]
impl SecretSource for FileSecretSource {
    async fn read_signing_key(&self) -> Result<SigningKeyPem, KeyError> {
        let private_key_pem = read_pem(&self.private_key_path).await?;
        Ok(SigningKeyPem {
            kid: self.active_kid.clone(),
            private_key_pem,
        })
    }

    async fn read_public_keys(&self) -> Result<HashMap<String, String>, KeyError> {
        let unreadable = |e: std::io::Error| KeyError::SourceUnavailable {
            message: format!("cannot list {}: {}", self.public_keys_dir.display(), e),
        };

        let mut entries = tokio::fs::read_dir(&self.public_keys_dir)
            .await
            .map_err(unreadable)?;
        let mut keys = HashMap::new();

        while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("pem") {
                continue;
            }
            let Some(kid) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            keys.insert(kid.to_string(), read_pem(&path).await?);
        }

        debug!(
            dir = %self.public_keys_dir.display(),
            count = keys.len(),
            "Read public keys from disk"
        );
        Ok(keys)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
