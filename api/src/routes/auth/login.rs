use actix_web::{web, HttpResponse};
use tracing::info;
use validator::Validate;

use tw_core::errors::{AuthError, DomainError};

use crate::dto::auth::{LoginRequest, LoginResponse};
use crate::handlers::error::{handle_domain_error, handle_validation_error};

use super::AppState;

/// Handler for POST /auth/login
///
/// Checks the email/password pair with the user service and issues a
/// 15-minute access token plus a 7-day refresh token.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "ada@example.com",
///     "password": "string"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "user_id": 17,
///     "access_token": "eyJ...",
///     "refresh_token": "eyJ...",
///     "expires_in": 900,
///     "token_type": "Bearer"
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Malformed email or empty password
/// - 401 Unauthorized: Wrong credentials
/// - 503 Service Unavailable: User service unreachable
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return handle_validation_error(&errors);
    }

    let check = match state
        .credentials
        .validate(&request.email, &request.password)
        .await
    {
        Ok(check) => check,
        Err(error) => return handle_domain_error(&error, state.errors),
    };

    if !check.valid {
        let error = DomainError::from(AuthError::InvalidCredentials);
        return handle_domain_error(&error, state.errors);
    }

    match state.tokens.issue_pair(check.subject_id, check.role) {
        Ok(pair) => {
            info!(subject_id = check.subject_id, role = %check.role, "User logged in");
            HttpResponse::Ok().json(LoginResponse::new(check.subject_id, pair))
        }
        Err(error) => handle_domain_error(&error, state.errors),
    }
}
