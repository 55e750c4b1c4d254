use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;
use tracing::{debug, warn};
use validator::ValidationErrors;

use tw_core::errors::{AuthError, DomainError, TokenError};
use tw_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};

use crate::config::ErrorConfig;

/// HTTP status for a domain failure
///
/// - 401 for every token and credential failure
/// - 403 for a role mismatch
/// - 503 when a collaborator is unreachable or slow
/// - 500 otherwise
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Auth(AuthError::RoleMismatch { .. }) => StatusCode::FORBIDDEN,
        error if error.is_dependency_failure() => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Token(TokenError::TokenGenerationFailed) => StatusCode::INTERNAL_SERVER_ERROR,
        DomainError::Token(_) | DomainError::Auth(_) => StatusCode::UNAUTHORIZED,
        DomainError::Key(_) | DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Builds the JSON error response for `error`
///
/// Token and credential failures collapse to a generic `unauthorized` body
/// unless `config.expose_details` is set.
pub fn handle_domain_error(error: &DomainError, config: ErrorConfig) -> HttpResponse {
    let status = status_for(error);
    if status.is_server_error() {
        warn!(error = %error, status = status.as_u16(), "Request failed");
    } else {
        debug!(error = %error, status = status.as_u16(), "Request rejected");
    }

    let body = error.to_error_response();
    let body = if config.expose_details {
        body
    } else {
        body.flattened()
    };

    HttpResponse::build(status).json(body)
}

/// 400 response listing the fields that failed validation
pub fn handle_validation_error(errors: &ValidationErrors) -> HttpResponse {
    let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
    fields.sort_unstable();

    let body = ErrorResponse::new(error_codes::VALIDATION_ERROR, "Request validation failed")
        .add_detail("fields", fields);
    HttpResponse::BadRequest().json(body)
}

/// Domain error carried through actix's error type, used by middleware
#[derive(Debug)]
pub struct ApiError {
    error: DomainError,
    config: ErrorConfig,
}

impl ApiError {
    pub fn new(error: DomainError, config: ErrorConfig) -> Self {
        Self { error, config }
    }

    pub fn domain_error(&self) -> &DomainError {
        &self.error
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(&self.error)
    }

    fn error_response(&self) -> HttpResponse {
        handle_domain_error(&self.error, self.config)
    }
}
