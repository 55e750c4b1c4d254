//! Domain-specific error types and error handling.

mod types;


pub use types::{AuthError, KeyError, TokenError};

use thiserror::Error;
use tw_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Key(#[from] KeyError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Shorthand for a collaborator failure that is not a verdict on the token
    pub fn dependency_unavailable(dependency: impl Into<String>) -> Self {
        DomainError::Token(TokenError::DependencyUnavailable {
            dependency: dependency.into(),
        })
    }

    /// True when the failure came from an unreachable or slow collaborator
    pub fn is_dependency_failure(&self) -> bool {
        matches!(
            self,
            DomainError::Token(TokenError::DependencyUnavailable { .. })
                | DomainError::Key(KeyError::SourceUnavailable { .. })
                | DomainError::Key(KeyError::Timeout { .. })
        )
    }

    /// Stable error code for this failure
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Token(err) => match err {
                TokenError::MalformedToken => error_codes::TOKEN_MALFORMED,
                TokenError::InvalidSignature => error_codes::TOKEN_SIGNATURE_INVALID,
                TokenError::KeyNotFound { .. } => error_codes::TOKEN_KEY_NOT_FOUND,
                TokenError::TokenExpired => error_codes::TOKEN_EXPIRED,
                TokenError::ScopeMismatch => error_codes::TOKEN_SCOPE_MISMATCH,
                TokenError::TokenRevoked => error_codes::TOKEN_REVOKED,
                TokenError::DependencyUnavailable { .. } => error_codes::SERVICE_UNAVAILABLE,
                TokenError::TokenGenerationFailed => error_codes::INTERNAL_ERROR,
            },
            DomainError::Auth(err) => match err {
                AuthError::MissingCredential => error_codes::MISSING_CREDENTIAL,
                AuthError::InvalidAuthorizationHeader => error_codes::INVALID_AUTH_HEADER,
                AuthError::RoleMismatch { .. } => error_codes::FORBIDDEN,
                AuthError::InvalidCredentials => error_codes::INVALID_CREDENTIALS,
            },
            DomainError::Key(err) => match err {
                KeyError::SourceUnavailable { .. } | KeyError::Timeout { .. } => {
                    error_codes::SERVICE_UNAVAILABLE
                }
                _ => error_codes::INTERNAL_ERROR,
            },
            DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
        }
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        let response = ErrorResponse::new(self.error_code(), self.to_string());
        match self {
            DomainError::Token(TokenError::KeyNotFound { kid }) => response.add_detail("kid", kid),
            DomainError::Auth(AuthError::RoleMismatch { required, .. }) => {
                response.add_detail("required_role", required)
            }
            _ => response,
        }
    }
}

impl From<TokenError> for ErrorResponse {
    fn from(error: TokenError) -> Self {
        DomainError::from(error).to_error_response()
    }
}

impl From<AuthError> for ErrorResponse {
    fn from(error: AuthError) -> Self {
        DomainError::from(error).to_error_response()
    }
}
