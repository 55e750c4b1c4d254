use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::auth::{AccessTokenResponse, RefreshTokenRequest};
use crate::handlers::error::{handle_domain_error, handle_validation_error};

use super::AppState;

/// Handler for POST /auth/refresh
///
/// Exchanges a refresh token for a new access token with the same role.
/// The refresh token itself is not rotated.
///
/// # Request Body
///
/// ```json
/// {
///     "refresh_token": "eyJ..."
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Invalid, expired, revoked or wrong-scope token
/// - 503 Service Unavailable: Revocation store unreachable
pub async fn refresh_token(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return handle_validation_error(&errors);
    }

    match state.tokens.refresh(&request.refresh_token).await {
        Ok(access_token) => HttpResponse::Ok().json(AccessTokenResponse {
            access_token,
            expires_in: state.tokens.config().access_token_ttl.num_seconds(),
            token_type: "Bearer".to_string(),
        }),
        Err(error) => handle_domain_error(&error, state.errors),
    }
}
