//! Signing key material as returned by a secret source.

use std::collections::HashMap;

/// Active private key in PEM form together with its identifier
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKeyPem {
    pub kid: String,
    pub private_key_pem: String,
}

impl std::fmt::Debug for SigningKeyPem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyPem")
            .field("kid", &self.kid)
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}

/// One complete fetch from a secret source: the active signing key plus
/// every public key that should remain valid for verification.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    pub signing_key: SigningKeyPem,
    pub public_keys: HashMap<String, String>,
}

impl KeyMaterial {
    pub fn new(signing_key: SigningKeyPem, public_keys: HashMap<String, String>) -> Self {
        Self {
            signing_key,
            public_keys,
        }
    }

    pub fn active_kid(&self) -> &str {
        &self.signing_key.kid
    }
}
