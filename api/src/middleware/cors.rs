//! CORS middleware for browser clients
//!
//! Origins, methods and headers come from [`CorsConfig`]. With no origin
//! list every origin is accepted and echoed back, which keeps
//! `Access-Control-Allow-Credentials` usable.

use actix_cors::Cors;
use tracing::info;

use tw_shared::config::CorsConfig;

/// Creates a CORS middleware instance from `config`
pub fn create_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(config.allowed_methods.iter().map(String::as_str))
        .allowed_headers(config.allowed_headers.iter().map(String::as_str))
        .expose_headers(config.exposed_headers.iter().map(String::as_str))
        .max_age(config.max_age);

    if config.allows_any_origin() {
        info!("CORS allows any origin");
        cors = cors.allow_any_origin();
    } else {
        for origin in &config.allowed_origins {
            info!(origin = %origin, "Adding allowed origin");
            cors = cors.allowed_origin(origin);
        }
    }

    if config.allow_credentials {
        cors = cors.supports_credentials();
    }

    cors
}
