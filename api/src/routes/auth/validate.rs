use actix_web::{web, HttpRequest, HttpResponse};

use crate::dto::auth::PrincipalResponse;
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::authorization_header;

use super::AppState;

/// Handler for POST /auth/validate
///
/// Verifies the bearer access token and returns who it belongs to. Other
/// services call this instead of verifying tokens themselves.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {access_token}
/// ```
///
/// ## Success (200 OK)
/// ```json
/// {
///     "user_id": 17,
///     "role": "user"
/// }
/// ```
pub async fn validate_token(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let result = match authorization_header(req.headers()) {
        Ok(header) => state.gate.authorize(header, None).await,
        Err(error) => Err(error),
    };

    match result {
        Ok(principal) => HttpResponse::Ok().json(PrincipalResponse::from(principal)),
        Err(error) => handle_domain_error(&error, state.errors),
    }
}
