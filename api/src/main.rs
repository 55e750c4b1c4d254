use actix_web::{web, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tw_api::app::create_app;
use tw_api::config::{self, ErrorConfig};
use tw_api::routes::AppState;
use tw_core::services::clock::SystemClock;
use tw_core::services::keys::{KeyManager, KeyManagerConfig, KeyRefreshTask, TracingRefreshObserver};
use tw_core::services::token::{TokenService, TokenServiceConfig};
use tw_infra::{build_secret_source, HttpCredentialValidator, RedisRevocationStore};
use tw_shared::config::{LogFormat, LoggingConfig};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_file(logging.source_location)
                    .with_line_number(logging.source_location),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_file(logging.source_location)
                    .with_line_number(logging.source_location),
            )
            .init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load();
    init_tracing(&config.logging);

    info!(environment = %config.environment, "Starting TokenWarden API server");

    // Signing keys must load before the server accepts traffic
    let source = build_secret_source(&config.auth.keys).context("configuring secret source")?;
    let keys = KeyManager::initialize(source, KeyManagerConfig::from(&config.auth.keys))
        .await
        .context("loading signing keys")?
        .with_observer(Arc::new(TracingRefreshObserver));
    let keys = Arc::new(keys);
    let refresh_task = KeyRefreshTask::spawn(Arc::clone(&keys));

    let revocations = RedisRevocationStore::connect(config.cache.clone())
        .await
        .context("connecting to Redis")?;

    let token_config = TokenServiceConfig::from(&config.auth.jwt)
        .with_revocation_timeout(Duration::from_secs(config.cache.response_timeout.max(1)));
    let tokens = Arc::new(TokenService::new(
        keys,
        Arc::new(revocations),
        Arc::new(SystemClock),
        token_config,
    ));

    let credentials = Arc::new(
        HttpCredentialValidator::new(&config.credentials)
            .context("configuring user service client")?,
    );

    let state = web::Data::new(
        AppState::new(tokens, credentials, ErrorConfig::from_app_config(&config))
            .with_cors(config.cors.clone()),
    );

    let bind_address = config.server.bind_address();
    info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("binding {}", bind_address))?
        .run()
        .await?;

    refresh_task.shutdown().await;
    info!("TokenWarden API server stopped");
    Ok(())
}
