//! Error types for key management, token verification and authorization
//!
//! Variants keep every internal distinction so that logs can tell a key
//! rotation gap from a forged signature. The HTTP layer decides how much of
//! that to reveal.

use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a structurally valid compact JWS, or a header without `kid`
    #[error("Malformed token")]
    MalformedToken,

    #[error("Token signature verification failed")]
    InvalidSignature,

    /// The token names a key this process does not (yet) know about
    #[error("No verification key for kid {kid}")]
    KeyNotFound { kid: String },

    #[error("Token expired")]
    TokenExpired,

    #[error("Token scope does not match the required scope")]
    ScopeMismatch,

    #[error("Token revoked")]
    TokenRevoked,

    /// A collaborator timed out or failed; says nothing about token validity
    #[error("Dependency unavailable: {dependency}")]
    DependencyUnavailable { dependency: String },

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

/// Request authorization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing authorization credential")]
    MissingCredential,

    #[error("Authorization header must use the Bearer scheme")]
    InvalidAuthorizationHeader,

    #[error("Role {actual} is not allowed, {required} required")]
    RoleMismatch { required: String, actual: String },

    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Signing key source and key material errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Secret source unavailable: {message}")]
    SourceUnavailable { message: String },

    #[error("Secret source timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Invalid key material for kid {kid}: {message}")]
    InvalidKeyMaterial { kid: String, message: String },

    /// The batch carries no public key for the active signing key
    #[error("Public key for active kid {kid} is missing")]
    MissingActivePublicKey { kid: String },

    #[error("Initial key load failed: {message}")]
    InitialKeyLoadFailed { message: String },
}
