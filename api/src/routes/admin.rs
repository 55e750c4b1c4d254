//! Admin-only routes

use actix_web::HttpResponse;

use crate::dto::auth::PrincipalResponse;
use crate::middleware::auth::AuthContext;

/// Handler for GET /api/admin/whoami
///
/// Only reachable with an `admin` access token.
pub async fn whoami(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(PrincipalResponse {
        user_id: auth.subject_id,
        role: auth.role,
    })
}
