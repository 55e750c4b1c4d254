//! Secret source trait for signing key material

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::entities::keys::SigningKeyPem;
use crate::errors::KeyError;

/// External system holding RS256 signing material
///
/// Implementations return raw PEM strings; parsing and validation happen in
/// the key manager so that every source gets the same all-or-nothing rules.
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Read the active signing key and its `kid`
    async fn read_signing_key(&self) -> Result<SigningKeyPem, KeyError>;

    /// Read every public key that should verify, keyed by `kid`
    async fn read_public_keys(&self) -> Result<HashMap<String, String>, KeyError>;

    /// Short name used in logs
    fn name(&self) -> &'static str {
        "secret source"
    }
}
