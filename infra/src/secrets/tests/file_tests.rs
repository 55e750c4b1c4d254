//! File secret source tests

use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use tw_core::errors::KeyError;
use tw_core::services::keys::{KeyManager, KeyManagerConfig, SecretSource};
use tw_core::testutil::{
    PRIMARY_PRIVATE_PEM, PRIMARY_PUBLIC_PEM, ROTATED_PRIVATE_PEM, ROTATED_PUBLIC_PEM,
};
use tw_shared::config::{KeyConfig, KeySourceKind};

use crate::secrets::{build_secret_source, FileSecretSource};

struct KeyDir {
    root: TempDir,
}

impl KeyDir {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("public")).unwrap();
        Self { root }
    }

    fn write_private(&self, pem: &str) {
        fs::write(self.root.path().join("private.pem"), pem).unwrap();
    }

    fn write_public(&self, kid: &str, pem: &str) {
        fs::write(self.root.path().join("public").join(format!("{}.pem", kid)), pem).unwrap();
    }

    fn source(&self, kid: &str) -> FileSecretSource {
        FileSecretSource::new(
            self.root.path().join("private.pem"),
            kid,
            self.root.path().join("public"),
        )
    }
}

#[tokio::test]
async fn test_reads_private_key_with_configured_kid() {
    let dir = KeyDir::new();
    dir.write_private(PRIMARY_PRIVATE_PEM);

    let key = dir.source("2024-01").read_signing_key().await.unwrap();
    assert_eq!(key.kid, "2024-01");
    assert_eq!(key.private_key_pem, PRIMARY_PRIVATE_PEM);
}

#[tokio::test]
async fn test_public_keys_keyed_by_file_stem() {
    let dir = KeyDir::new();
    dir.write_public("2024-01", PRIMARY_PUBLIC_PEM);
    dir.write_public("2024-02", ROTATED_PUBLIC_PEM);
    fs::write(dir.root.path().join("public").join("README.txt"), "ignored").unwrap();

    let keys = dir.source("2024-01").read_public_keys().await.unwrap();
    let mut kids: Vec<_> = keys.keys().cloned().collect();
    kids.sort();
    assert_eq!(kids, vec!["2024-01".to_string(), "2024-02".to_string()]);
}

#[tokio::test]
async fn test_missing_private_key_is_source_unavailable() {
    let dir = KeyDir::new();
    let result = dir.source("2024-01").read_signing_key().await;
    assert!(matches!(result, Err(KeyError::SourceUnavailable { .. })));
}

#[tokio::test]
async fn test_missing_public_dir_is_source_unavailable() {
    let dir = KeyDir::new();
    let source = FileSecretSource::new(
        dir.root.path().join("private.pem"),
        "2024-01",
        dir.root.path().join("nope"),
    );
    let result = source.read_public_keys().await;
    assert!(matches!(result, Err(KeyError::SourceUnavailable { .. })));
}

#[tokio::test]
async fn test_rotation_by_file_replacement() {
    let dir = KeyDir::new();
    dir.write_private(PRIMARY_PRIVATE_PEM);
    dir.write_public("2024-01", PRIMARY_PUBLIC_PEM);

    let manager = KeyManager::initialize(Arc::new(dir.source("2024-01")), KeyManagerConfig::default())
        .await
        .unwrap();
    assert_eq!(manager.active_kid(), "2024-01");

    // New key pair published; the active kid is still configured as 2024-01,
    // so a mismatched private key must be rejected and the old snapshot kept
    dir.write_public("2024-02", ROTATED_PUBLIC_PEM);
    dir.write_private(ROTATED_PRIVATE_PEM);
    assert!(manager.refresh().await.is_err());
    assert_eq!(manager.active_kid(), "2024-01");
    assert_eq!(manager.public_keys(), vec!["2024-01".to_string()]);
}

#[test]
fn test_build_secret_source_selects_kind() {
    let config = KeyConfig::default();
    assert_eq!(config.source, KeySourceKind::File);
    assert_eq!(build_secret_source(&config).unwrap().name(), "file");

    let vault = KeyConfig::default().with_vault("http://vault:8200", "s.token");
    assert_eq!(build_secret_source(&vault).unwrap().name(), "vault");

    let mut incomplete = KeyConfig::default();
    incomplete.source = KeySourceKind::Vault;
    assert!(build_secret_source(&incomplete).is_err());
}
