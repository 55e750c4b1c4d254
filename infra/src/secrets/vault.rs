//! HashiCorp Vault secret source
//!
//! Reads two KV secrets under one mount:
//!
//! - `{mount}/private_key` with fields `kid` and `private_key`
//! - `{mount}/public_keys` with one field per `kid`, each a PEM public key
//!
//! A `private_key` secret without a `kid` field signs as `default`, and a
//! lone `public_key` field in `public_keys` is published under `default`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use tw_core::domain::entities::keys::SigningKeyPem;
use tw_core::errors::KeyError;
use tw_core::services::keys::SecretSource;
use tw_shared::config::KeyConfig;

use crate::InfrastructureError;

/// `kid` used when the backend does not name its key
pub const DEFAULT_KID: &str = "default";

const TOKEN_HEADER: &str = "X-Vault-Token";

#[derive(Debug, Deserialize)]
struct SecretEnvelope {
    #[serde(default)]
    data: Option<HashMap<String, Value>>,
}

/// [`SecretSource`] reading RS256 keys from Vault's HTTP API
pub struct VaultSecretSource {
    http_client: reqwest::Client,
    addr: String,
    token: String,
    mount: String,
}

impl std::fmt::Debug for VaultSecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSecretSource")
            .field("addr", &self.addr)
            .field("mount", &self.mount)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl VaultSecretSource {
    /// Creates a Vault source
    ///
    /// # Arguments
    /// * `addr` - Vault server address, e.g. `http://vault:8200`
    /// * `token` - Vault access token
    /// * `mount` - KV mount holding `private_key` and `public_keys`
    /// * `timeout` - Per-request timeout
    pub fn new(
        addr: impl Into<String>,
        token: impl Into<String>,
        mount: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, InfrastructureError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            addr: addr.into().trim_end_matches('/').to_string(),
            token: token.into(),
            mount: mount.into().trim_matches('/').to_string(),
        })
    }

    /// Builds the source from `KEY_SOURCE=vault` settings
    pub fn from_config(config: &KeyConfig) -> Result<Self, InfrastructureError> {
        let addr = config
            .vault_addr
            .clone()
            .ok_or_else(|| InfrastructureError::Config("VAULT_ADDR is not set".to_string()))?;
        let token = config
            .vault_token
            .clone()
            .ok_or_else(|| InfrastructureError::Config("VAULT_TOKEN is not set".to_string()))?;

        Self::new(
            addr,
            token,
            config.vault_mount.clone(),
            Duration::from_secs(config.source_timeout.max(1)),
        )
    }

    fn secret_url(&self, name: &str) -> String {
        format!("{}/v1/{}/{}", self.addr, self.mount, name)
    }

    /// Reads the `data` map of one secret
    async fn read_secret(&self, name: &str) -> Result<HashMap<String, Value>, KeyError> {
        let url = self.secret_url(name);
        debug!(mount = %self.mount, secret = name, "Reading secret from Vault");

        let response = self
            .http_client
            .get(&url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| unavailable(format!("request for {} failed: {}", name, e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(unavailable(format!("secret {}/{} not found", self.mount, name)));
        }
        if !status.is_success() {
            warn!(secret = name, status = %status, "Vault returned an error status");
            return Err(unavailable(format!("Vault returned {} for {}", status, name)));
        }

        let envelope: SecretEnvelope = response
            .json()
            .await
            .map_err(|e| unavailable(format!("unreadable response for {}: {}", name, e)))?;

        envelope
            .data
            .ok_or_else(|| unavailable(format!("secret {}/{} has no data", self.mount, name)))
    }
}

fn unavailable(message: String) -> KeyError {
    KeyError::SourceUnavailable { message }
}

fn string_field(data: &HashMap<String, Value>, field: &str) -> Option<String> {
    data.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Turns the `private_key` secret's data into a signing key
pub(crate) fn parse_signing_key(data: &HashMap<String, Value>) -> Result<SigningKeyPem, KeyError> {
    let kid = string_field(data, "kid").unwrap_or_else(|| DEFAULT_KID.to_string());
    let private_key_pem =
        string_field(data, "private_key").ok_or_else(|| KeyError::InvalidKeyMaterial {
            kid: kid.clone(),
            message: "secret has no private_key field".to_string(),
        })?;

    Ok(SigningKeyPem {
        kid,
        private_key_pem,
    })
}

/// Turns the `public_keys` secret's data into `kid → PEM`
pub(crate) fn parse_public_keys(
    data: &HashMap<String, Value>,
) -> Result<HashMap<String, String>, KeyError> {
    let mut keys = HashMap::with_capacity(data.len());

    for (field, value) in data {
        let pem = value
            .as_str()
            .filter(|pem| !pem.trim().is_empty())
            .ok_or_else(|| KeyError::InvalidKeyMaterial {
                kid: field.clone(),
                message: "public key is not a PEM string".to_string(),
            })?;

        let kid = if field == "public_key" {
            DEFAULT_KID
        } else {
            field.as_str()
        };
        keys.insert(kid.to_string(), pem.to_string());
    }

    Ok(keys)
}

#[async_trait]
impl SecretSource for VaultSecretSource {
    async fn read_signing_key(&self) -> Result<SigningKeyPem, KeyError> {
        let data = self.read_secret("private_key").await?;
        parse_signing_key(&data)
    }

    async fn read_public_keys(&self) -> Result<HashMap<String, String>, KeyError> {
        let data = self.read_secret("public_keys").await?;
        parse_public_keys(&data)
    }

    fn name(&self) -> &'static str {
        "vault"
    }
}
