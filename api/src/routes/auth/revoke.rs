use actix_web::{web, HttpResponse};
use validator::Validate;

use tw_core::domain::entities::token::RevocationKind;

use crate::dto::auth::{MessageResponse, RevokeRequest};
use crate::handlers::error::{handle_domain_error, handle_validation_error};

use super::AppState;

/// Handler for POST /auth/revoke
///
/// Deactivates any token for the refresh-token lifetime, which outlasts
/// every token this service issues.
///
/// # Request Body
///
/// ```json
/// {
///     "token": "eyJ..."
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Empty token
/// - 503 Service Unavailable: Revocation store unreachable
pub async fn revoke_token(
    state: web::Data<AppState>,
    request: web::Json<RevokeRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return handle_validation_error(&errors);
    }

    match state
        .tokens
        .revoke_for(&request.token, RevocationKind::ExplicitRevoke)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new("Token revoked successfully")),
        Err(error) => handle_domain_error(&error, state.errors),
    }
}
