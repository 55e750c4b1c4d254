//! Immutable, fully parsed set of signing and verification keys

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::domain::entities::keys::KeyMaterial;
use crate::errors::KeyError;

/// One consistent view of the key set
///
/// A snapshot is only ever built from a batch in which every key parsed and
/// the active key pair matched, so readers never see a partial batch.
#[derive(Clone)]
pub struct KeySnapshot {
    active_kid: String,
    signing_key: EncodingKey,
    public_keys: HashMap<String, DecodingKey>,
    loaded_at: DateTime<Utc>,
}

impl std::fmt::Debug for KeySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySnapshot")
            .field("active_kid", &self.active_kid)
            .field("kids", &self.kids())
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct Probe {
    kid: String,
}

impl KeySnapshot {
    /// Parses a complete batch of key material
    ///
    /// # Returns
    ///
    /// * `Ok(KeySnapshot)` - Every key parsed and the active pair matches
    /// * `Err(KeyError)` - The first key that failed, nothing is kept
    pub fn from_material(material: &KeyMaterial) -> Result<Self, KeyError> {
        let active_kid = material.active_kid().trim().to_string();
        if active_kid.is_empty() {
            return Err(KeyError::InvalidKeyMaterial {
                kid: String::new(),
                message: "active key has an empty kid".to_string(),
            });
        }

        let signing_key =
            EncodingKey::from_rsa_pem(material.signing_key.private_key_pem.as_bytes()).map_err(
                |e| KeyError::InvalidKeyMaterial {
                    kid: active_kid.clone(),
                    message: format!("invalid private key: {}", e),
                },
            )?;

        let mut public_keys = HashMap::with_capacity(material.public_keys.len());
        for (kid, pem) in &material.public_keys {
            if kid.trim().is_empty() {
                return Err(KeyError::InvalidKeyMaterial {
                    kid: kid.clone(),
                    message: "public key has an empty kid".to_string(),
                });
            }
            let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                KeyError::InvalidKeyMaterial {
                    kid: kid.clone(),
                    message: format!("invalid public key: {}", e),
                }
            })?;
            public_keys.insert(kid.trim().to_string(), key);
        }

        let active_public = public_keys
            .get(&active_kid)
            .ok_or_else(|| KeyError::MissingActivePublicKey {
                kid: active_kid.clone(),
            })?;
        verify_pair(&active_kid, &signing_key, active_public)?;

        Ok(Self {
            active_kid,
            signing_key,
            public_keys,
            loaded_at: Utc::now(),
        })
    }

    pub fn active_kid(&self) -> &str {
        &self.active_kid
    }

    pub fn signing_key(&self) -> &EncodingKey {
        &self.signing_key
    }

    /// Verification key for `kid`, if the snapshot holds one
    pub fn public_key(&self, kid: &str) -> Option<&DecodingKey> {
        self.public_keys.get(kid)
    }

    pub fn contains(&self, kid: &str) -> bool {
        self.public_keys.contains_key(kid)
    }

    /// Sorted list of every verification `kid`
    pub fn kids(&self) -> Vec<String> {
        let mut kids: Vec<String> = self.public_keys.keys().cloned().collect();
        kids.sort();
        kids
    }

    pub fn len(&self) -> usize {
        self.public_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.public_keys.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Signs a throwaway payload with the private key and checks it against the
/// published public key, catching a rotation that updated only one half.
fn verify_pair(kid: &str, signing_key: &EncodingKey, public_key: &DecodingKey) -> Result<(), KeyError> {
    let probe = Probe {
        kid: kid.to_string(),
    };
    let mismatch = |message: String| KeyError::InvalidKeyMaterial {
        kid: kid.to_string(),
        message,
    };

    let token = encode(&Header::new(Algorithm::RS256), &probe, signing_key)
        .map_err(|e| mismatch(format!("private key cannot sign: {}", e)))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = false;
    validation.required_spec_claims = HashSet::new();

    decode::<Probe>(&token, public_key, &validation)
        .map(|_| ())
        .map_err(|_| mismatch("public key does not match the active private key".to_string()))
}
