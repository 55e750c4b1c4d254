//! Domain entities representing core business objects.

pub mod keys;
pub mod token;


// Re-export commonly used types
pub use keys::{KeyMaterial, SigningKeyPem};
pub use token::{
    revocation_key, token_fingerprint, Claims, Principal, RevocationKind, Role, Scope, TokenPair,
    ACCESS_TOKEN_EXPIRY_MINUTES, REFRESH_TOKEN_EXPIRY_DAYS, REVOCATION_KEY_PREFIX,
    REVOCATION_MARKER,
};
