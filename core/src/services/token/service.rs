//! Main token service implementation

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, Header, Validation};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::entities::token::{
    revocation_key, token_fingerprint, Claims, Principal, RevocationKind, Role, Scope, TokenPair,
    REVOCATION_MARKER,
};
use crate::errors::{DomainError, TokenError};
use crate::repositories::RevocationStore;
use crate::services::clock::Clock;
use crate::services::keys::KeyManager;

use super::config::TokenServiceConfig;

const REVOCATION_STORE: &str = "revocation store";

/// Service for issuing, verifying, refreshing and revoking JWTs
pub struct TokenService {
    key_manager: Arc<KeyManager>,
    revocations: Arc<dyn RevocationStore>,
    clock: Arc<dyn Clock>,
    config: TokenServiceConfig,
    validation: Validation,
    structural: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("config", &self.config)
            .field("active_kid", &self.key_manager.active_kid())
            .finish()
    }
}

impl TokenService {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `key_manager` - Source of signing and verification keys
    /// * `revocations` - Store of deactivated token fingerprints
    /// * `clock` - Time source for `iat`/`exp`
    /// * `config` - Token lifetimes and store timeout
    pub fn new(
        key_manager: Arc<KeyManager>,
        revocations: Arc<dyn RevocationStore>,
        clock: Arc<dyn Clock>,
        config: TokenServiceConfig,
    ) -> Self {
        // Expiry is checked against the injected clock, not the system time
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        // Decodes header and payload without checking the signature
        let mut structural = Validation::new(Algorithm::RS256);
        structural.insecure_disable_signature_validation();
        structural.validate_exp = false;
        structural.validate_aud = false;
        structural.required_spec_claims.clear();

        Self {
            key_manager,
            revocations,
            clock,
            config,
            validation,
            structural,
        }
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    pub fn key_manager(&self) -> &Arc<KeyManager> {
        &self.key_manager
    }

    /// Signs a token for `subject_id` with the active key
    ///
    /// Never touches the network. With a fixed clock and key the output is
    /// byte-for-byte reproducible.
    pub fn issue(
        &self,
        subject_id: i64,
        role: Role,
        scope: Scope,
        ttl: Duration,
    ) -> Result<String, DomainError> {
        let signing = self.key_manager.active_signing_key();
        let claims = Claims::new(subject_id, role, scope, self.clock.now(), ttl, &signing.kid)
            .ok_or_else(|| {
                warn!(ttl_secs = ttl.num_seconds(), "Token expiry out of range");
                DomainError::Token(TokenError::TokenGenerationFailed)
            })?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(signing.kid.clone());

        encode(&header, &claims, &signing.key).map_err(|e| {
            warn!(kid = %signing.kid, error = %e, "Failed to sign token");
            DomainError::Token(TokenError::TokenGenerationFailed)
        })
    }

    /// Issues a 15-minute `Authentication` token
    pub fn issue_access_token(&self, subject_id: i64, role: Role) -> Result<String, DomainError> {
        self.issue(subject_id, role, Scope::Authentication, self.config.access_token_ttl)
    }

    /// Issues a 7-day `Refresh` token
    pub fn issue_refresh_token(&self, subject_id: i64, role: Role) -> Result<String, DomainError> {
        self.issue(subject_id, role, Scope::Refresh, self.config.refresh_token_ttl)
    }

    /// Issues the access/refresh pair handed out at login
    pub fn issue_pair(&self, subject_id: i64, role: Role) -> Result<TokenPair, DomainError> {
        let access_token = self.issue_access_token(subject_id, role)?;
        let refresh_token = self.issue_refresh_token(subject_id, role)?;

        debug!(subject_id, role = %role, "Issued token pair");
        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_ttl.num_seconds(),
        ))
    }

    /// Verifies `token` for `required_scope`
    ///
    /// Checks run in a fixed order and stop at the first failure:
    /// 1. structural parse of header and payload, including the `kid`
    /// 2. revocation lookup on the raw token fingerprint
    /// 3. public key resolution
    /// 4. signature, then expiry
    /// 5. scope
    ///
    /// # Returns
    ///
    /// * `Ok(Principal)` - Subject and role carried by the token
    /// * `Err(DomainError)` - The first failed check; a store outage is
    ///   `DependencyUnavailable`, never an invalid-token verdict
    pub async fn verify(&self, token: &str, required_scope: Scope) -> Result<Principal, DomainError> {
        let kid = self.parse_structure(token)?;

        if self.is_revoked(token).await? {
            debug!("Rejected revoked token");
            return Err(TokenError::TokenRevoked.into());
        }

        let decoding_key = self.key_manager.public_key(&kid).map_err(|e| {
            warn!(kid = %kid, "Token signed with unknown key");
            e
        })?;

        let claims = decode::<Claims>(token, &decoding_key, &self.validation)
            .map_err(|e| map_decode_error(&kid, e.kind()))?
            .claims;

        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::TokenExpired.into());
        }

        if claims.scope != required_scope {
            debug!(
                subject_id = claims.user_id,
                scope = %claims.scope,
                required = %required_scope,
                "Token scope mismatch"
            );
            return Err(TokenError::ScopeMismatch.into());
        }

        Ok(claims.principal())
    }

    /// Exchanges a refresh token for a new access token
    ///
    /// The role is copied from the refresh token unchanged.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, DomainError> {
        let principal = self.verify(refresh_token, Scope::Refresh).await?;
        let access_token = self.issue_access_token(principal.subject_id, principal.role)?;

        debug!(subject_id = principal.subject_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Records `token` as deactivated for `ttl`
    ///
    /// The caller picks a TTL at least as long as the token's remaining
    /// lifetime (see [`revocation_ttl_for`](Self::revocation_ttl_for)).
    /// Sub-second TTLs are rounded up to one second.
    pub async fn revoke(&self, token: &str, ttl: std::time::Duration) -> Result<(), DomainError> {
        if token.trim().is_empty() {
            return Err(TokenError::MalformedToken.into());
        }

        let fingerprint = token_fingerprint(token);
        let key = revocation_key(&fingerprint);
        let ttl = ttl.max(std::time::Duration::from_secs(1));

        match tokio::time::timeout(
            self.config.revocation_timeout,
            self.revocations.set(&key, REVOCATION_MARKER, ttl),
        )
        .await
        {
            Ok(Ok(())) => {
                info!(
                    fingerprint = %mask(&fingerprint),
                    ttl_secs = ttl.as_secs(),
                    "Token revoked"
                );
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Revocation store write failed");
                Err(DomainError::dependency_unavailable(REVOCATION_STORE))
            }
            Err(_) => {
                warn!("Revocation store write timed out");
                Err(DomainError::dependency_unavailable(REVOCATION_STORE))
            }
        }
    }

    /// Revokes `token` with the TTL policy for `kind`
    pub async fn revoke_for(&self, token: &str, kind: RevocationKind) -> Result<(), DomainError> {
        self.revoke(token, self.revocation_ttl_for(kind)).await
    }

    /// Revocation TTL covering the longest remaining lifetime for `kind`
    pub fn revocation_ttl_for(&self, kind: RevocationKind) -> std::time::Duration {
        let ttl = match kind {
            RevocationKind::Logout => self.config.access_token_ttl,
            RevocationKind::ExplicitRevoke => self.config.refresh_token_ttl,
        };
        ttl.to_std().unwrap_or_default()
    }

    /// Decodes header and payload of a three-segment JWS
    ///
    /// Returns the `kid` shared by header and payload. Anything else, from a
    /// bad segment count to a payload that is not valid [`Claims`] JSON, is
    /// `MalformedToken`.
    fn parse_structure(&self, token: &str) -> Result<String, DomainError> {
        if token.split('.').count() != 3 {
            return Err(TokenError::MalformedToken.into());
        }

        let parsed = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &self.structural)
            .map_err(|e| {
                debug!(error = ?e.kind(), "Token failed structural parse");
                TokenError::MalformedToken
            })?;

        let kid = parsed
            .header
            .kid
            .filter(|kid| !kid.trim().is_empty())
            .ok_or(TokenError::MalformedToken)?;

        if parsed.claims.kid != kid {
            debug!(kid = %kid, claims_kid = %parsed.claims.kid, "Header and payload kid disagree");
            return Err(TokenError::MalformedToken.into());
        }

        Ok(kid)
    }

    /// Checks the revocation store for `token`
    pub async fn is_revoked(&self, token: &str) -> Result<bool, DomainError> {
        let key = revocation_key(&token_fingerprint(token));

        match tokio::time::timeout(self.config.revocation_timeout, self.revocations.exists(&key))
            .await
        {
            Ok(Ok(revoked)) => Ok(revoked),
            Ok(Err(e)) => {
                warn!(error = %e, "Revocation store lookup failed");
                Err(DomainError::dependency_unavailable(REVOCATION_STORE))
            }
            Err(_) => {
                warn!("Revocation store lookup timed out");
                Err(DomainError::dependency_unavailable(REVOCATION_STORE))
            }
        }
    }
}

fn map_decode_error(kid: &str, kind: &ErrorKind) -> DomainError {
    // Header and payload already parsed, so encoding errors here are the signature's
    let error = match kind {
        ErrorKind::InvalidSignature
        | ErrorKind::Base64(_)
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidRsaKey(_)
        | ErrorKind::InvalidKeyFormat
        | ErrorKind::Crypto(_) => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::TokenExpired,
        _ => TokenError::MalformedToken,
    };
    debug!(kid = %kid, error = ?kind, "Token failed verification");
    error.into()
}

/// First eight hex characters of a fingerprint, for logs
fn mask(fingerprint: &str) -> &str {
    fingerprint.get(..8).unwrap_or(fingerprint)
}
