//! Authorization gate applied to every protected request

use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::token::{Principal, Role, Scope};
use crate::errors::{AuthError, DomainError, TokenError};
use crate::services::token::TokenService;

/// Required prefix of the `Authorization` header value
pub const BEARER_PREFIX: &str = "Bearer ";

/// Progress of one request through the gate
///
/// Stages only move forward. A failure at any point ends the request as
/// rejected; there is no retry within a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GateStage {
    NoCredential,
    ParsedToken,
    RevocationChecked,
    KeyResolved,
    SignatureVerified,
    ClaimsChecked,
    Authorized,
}

impl GateStage {
    /// Last stage completed before `error` rejected the request
    pub fn reached_before(error: &DomainError) -> GateStage {
        match error {
            DomainError::Auth(AuthError::RoleMismatch { .. }) => GateStage::ClaimsChecked,
            DomainError::Auth(_) => GateStage::NoCredential,
            DomainError::Token(err) => match err {
                TokenError::MalformedToken => GateStage::NoCredential,
                TokenError::TokenRevoked | TokenError::DependencyUnavailable { .. } => {
                    GateStage::ParsedToken
                }
                TokenError::KeyNotFound { .. } => GateStage::RevocationChecked,
                TokenError::InvalidSignature => GateStage::KeyResolved,
                TokenError::TokenExpired | TokenError::ScopeMismatch => {
                    GateStage::SignatureVerified
                }
                TokenError::TokenGenerationFailed => GateStage::NoCredential,
            },
            DomainError::Key(_) | DomainError::Internal { .. } => GateStage::NoCredential,
        }
    }
}

/// Configuration for the authorization gate
#[derive(Debug, Clone)]
pub struct AuthorizationGateConfig {
    /// Scope every presented token must carry
    pub required_scope: Scope,
}

impl Default for AuthorizationGateConfig {
    fn default() -> Self {
        Self {
            required_scope: Scope::Authentication,
        }
    }
}

/// Extracts the token from an `Authorization` header value
///
/// # Returns
///
/// * `Ok(&str)` - The credential after `Bearer `
/// * `Err(AuthError::MissingCredential)` - No header, or an empty one
/// * `Err(AuthError::InvalidAuthorizationHeader)` - Any other scheme, or no token
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingCredential)?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .ok_or(AuthError::InvalidAuthorizationHeader)?;

    if token.is_empty() || token.contains(' ') {
        return Err(AuthError::InvalidAuthorizationHeader);
    }
    Ok(token)
}

/// Turns a raw `Authorization` header into an authenticated principal
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    tokens: Arc<TokenService>,
    config: AuthorizationGateConfig,
}

impl AuthorizationGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self::with_config(tokens, AuthorizationGateConfig::default())
    }

    pub fn with_config(tokens: Arc<TokenService>, config: AuthorizationGateConfig) -> Self {
        Self { tokens, config }
    }

    pub fn token_service(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Authenticates the request and, if `required_role` is set, authorizes it
    pub async fn authorize(
        &self,
        authorization_header: Option<&str>,
        required_role: Option<Role>,
    ) -> Result<Principal, DomainError> {
        let result = self.evaluate(authorization_header, required_role).await;

        if let Err(ref error) = result {
            debug!(
                stage = ?GateStage::reached_before(error),
                error = %error,
                "Request rejected by authorization gate"
            );
        }
        result
    }

    async fn evaluate(
        &self,
        authorization_header: Option<&str>,
        required_role: Option<Role>,
    ) -> Result<Principal, DomainError> {
        let token = extract_bearer_token(authorization_header)?;
        let principal = self.tokens.verify(token, self.config.required_scope).await?;

        if let Some(required) = required_role {
            if principal.role != required {
                return Err(AuthError::RoleMismatch {
                    required: required.to_string(),
                    actual: principal.role.to_string(),
                }
                .into());
            }
        }

        Ok(principal)
    }
}
