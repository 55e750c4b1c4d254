//! Application factory
//!
//! Builds the Actix-web application around a shared [`AppState`].

use actix_web::{
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error::InternalError,
    middleware::Condition,
    web, App, Error, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use tw_core::domain::entities::token::Role;
use tw_shared::errors::{error_codes, ErrorResponse};

use crate::middleware::auth::JwtAuth;
use crate::middleware::cors::create_cors;
use crate::routes::{admin, auth, health, AppState};

/// Create and configure the application with all dependencies
pub fn create_app(
    app_state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let cors = Condition::new(app_state.cors.enabled, create_cors(&app_state.cors));

    App::new()
        .app_data(app_state)
        .app_data(json_config())
        .wrap(cors)
        .wrap(TracingLogger::default())
        .route("/ping", web::get().to(health::ping))
        .service(
            web::scope("/auth")
                .route("/login", web::post().to(auth::login::login))
                .route("/refresh", web::post().to(auth::refresh::refresh_token))
                .route("/validate", web::post().to(auth::validate::validate_token))
                .route("/revoke", web::post().to(auth::revoke::revoke_token))
                .route(
                    "/logout",
                    web::post().to(auth::logout::logout).wrap(JwtAuth::new()),
                ),
        )
        .service(
            web::scope("/api/admin")
                .wrap(JwtAuth::require_role(Role::Admin))
                .route("/whoami", web::get().to(admin::whoami)),
        )
        .default_service(web::route().to(not_found))
}

/// Malformed JSON bodies answer with the shared error body
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            let body = ErrorResponse::new(error_codes::BAD_REQUEST, err.to_string());
            InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
        })
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "NOT_FOUND",
        "message": "The requested resource was not found"
    }))
}
