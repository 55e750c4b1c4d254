use actix_web::{web, HttpResponse};

use super::AppState;

/// Handler for GET /ping
///
/// Reports the signing key currently in use alongside liveness; never
/// touches Redis or the secret source.
pub async fn ping(state: web::Data<AppState>) -> HttpResponse {
    let keys = state.tokens.key_manager();

    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "tokenwarden",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "active_kid": keys.active_kid(),
        "public_keys": keys.public_keys().len(),
        "key_refresh_failures": keys.consecutive_failures(),
    }))
}
