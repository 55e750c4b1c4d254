use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;

use tw_core::domain::entities::token::RevocationKind;
use tw_core::errors::DomainError;
use tw_core::services::authorization::extract_bearer_token;

use crate::dto::auth::{LogoutRequest, MessageResponse};
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::{authorization_header, AuthContext};

use super::AppState;

/// Handler for POST /auth/logout
///
/// Revokes the presented access token and, if given, the refresh token.
/// Requires authentication via Bearer token in Authorization header.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {access_token}
/// ```
///
/// # Request Body (optional)
///
/// ```json
/// {
///     "refresh_token": "eyJ..."
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing or invalid access token
/// - 503 Service Unavailable: Revocation store unreachable
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    body: Option<web::Json<LogoutRequest>>,
) -> HttpResponse {
    let refresh_token = body.and_then(|body| body.into_inner().refresh_token);

    match revoke_session(&req, &state, refresh_token.as_deref()).await {
        Ok(()) => {
            info!(subject_id = auth.subject_id, "User logged out");
            HttpResponse::Ok().json(MessageResponse::new("Logged out successfully"))
        }
        Err(error) => handle_domain_error(&error, state.errors),
    }
}

async fn revoke_session(
    req: &HttpRequest,
    state: &AppState,
    refresh_token: Option<&str>,
) -> Result<(), DomainError> {
    let access_token = extract_bearer_token(authorization_header(req.headers())?)?;
    state
        .tokens
        .revoke_for(access_token, RevocationKind::Logout)
        .await?;

    if let Some(refresh_token) = refresh_token.filter(|token| !token.trim().is_empty()) {
        state
            .tokens
            .revoke_for(refresh_token, RevocationKind::ExplicitRevoke)
            .await?;
    }
    Ok(())
}
