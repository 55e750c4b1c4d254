//! # TokenWarden Core
//!
//! Core logic of the TokenWarden server: signing key lifecycle, token
//! issuance and verification, revocation and request authorization.
//! Network adapters (Vault, Redis, user service) live in `tw_infra`; this
//! crate only depends on the traits they implement.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

// Re-export commonly used types for convenience
pub use domain::entities::{
    revocation_key, token_fingerprint, Claims, KeyMaterial, Principal, RevocationKind, Role,
    Scope, SigningKeyPem, TokenPair,
};
pub use errors::{AuthError, DomainError, DomainResult, KeyError, TokenError};
pub use repositories::{InMemoryRevocationStore, RevocationStore};
pub use services::{
    AuthorizationGate, AuthorizationGateConfig, Clock, CredentialCheck, CredentialValidator,
    GateStage, KeyManager, KeyManagerConfig, KeyRefreshTask, KeySnapshot, ManualClock,
    SecretSource, SystemClock, TokenService, TokenServiceConfig,
};
