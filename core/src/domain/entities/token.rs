//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Access token expiration time (15 minutes)
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Refresh token expiration time (7 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Namespace of revocation records in the revocation store
pub const REVOCATION_KEY_PREFIX: &str = "deactivated_token";

/// Value written for every revocation record; only presence matters
pub const REVOCATION_MARKER: &str = "deactivated";

/// Role carried in a token and checked by role-restricted operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Purpose a token was minted for
///
/// An access token is `Authentication`, a refresh token is `Refresh`. A token
/// presented for the other purpose is rejected even with a valid signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Authentication,
    Refresh,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Authentication => "authentication",
            Scope::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims structure for JWT payload
///
/// The payload is flat JSON so that standard JWT consumers can read it.
/// There is no random `jti`: issuing twice with the same clock and key yields
/// the same token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub user_id: i64,

    /// Role of the subject at issuance
    pub role: Role,

    /// Purpose of the token
    pub scope: Scope,

    /// Expiration timestamp (seconds since epoch)
    pub exp: i64,

    /// Issued at timestamp (seconds since epoch)
    pub iat: i64,

    /// Identifier of the signing key, mirrored from the header
    pub kid: String,
}

impl Claims {
    /// Creates claims issued at `now` and valid for `ttl`
    ///
    /// Returns `None` when `now + ttl` is not a representable timestamp.
    pub fn new(
        user_id: i64,
        role: Role,
        scope: Scope,
        now: DateTime<Utc>,
        ttl: Duration,
        kid: impl Into<String>,
    ) -> Option<Self> {
        let expires_at = now.checked_add_signed(ttl)?;

        Some(Self {
            user_id,
            role,
            scope,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            kid: kid.into(),
        })
    }

    /// Checks whether the claims have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Seconds left until expiry at `now`, zero once expired
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.exp - now.timestamp()).max(0)
    }

    pub fn principal(&self) -> Principal {
        Principal {
            subject_id: self.user_id,
            role: self.role,
        }
    }
}

/// Authenticated identity produced by a successful verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub subject_id: i64,
    pub role: Role,
}

/// Token pair returned after login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token (short-lived)
    pub access_token: String,

    /// JWT refresh token (long-lived)
    pub refresh_token: String,

    /// Access token expiry in seconds
    pub expires_in: i64,

    /// Token type (always "Bearer")
    pub token_type: String,
}

impl TokenPair {
    /// Creates a new token pair
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
            token_type: "Bearer".to_string(),
        }
    }
}

/// Why a token is being revoked; selects the revocation TTL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationKind {
    /// Session end; covers the remaining life of an access token
    Logout,
    /// Explicit revocation; covers the remaining life of a refresh token
    ExplicitRevoke,
}

/// SHA-256 hex digest of the raw token string
pub fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Revocation store key for a fingerprint: `deactivated_token:<fingerprint>`
pub fn revocation_key(fingerprint: &str) -> String {
    format!("{}:{}", REVOCATION_KEY_PREFIX, fingerprint)
}
