use actix_web::{web, HttpServer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, info_span, warn};

use sp_api::app::create_app;
use sp_api::routes::auth::AppState;
use sp_api::telemetry;
use sp_core::services::token::{TokenService, TokenServiceConfig};
use sp_infra::database::{DatabasePool, MySqlTokenRepository};
use sp_shared::config::{AppConfig, ENV_PREFIX};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Config path from the first argument or SP_CONFIG
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(format!("{}_CONFIG", ENV_PREFIX)).ok())
        .map(PathBuf::from);

    let config = AppConfig::load(config_path.as_deref())?;
    telemetry::init(&config.logging)?;

    info!(
        environment = %config.environment,
        config_file = ?config_path,
        "Starting auth service"
    );
    if config.auth.jwt.is_using_default_secret() {
        warn!("Using the built-in development JWT secret");
    }

    let pool = DatabasePool::new(config.database.clone()).await?;
    if config.database.run_migrations {
        pool.run_migrations().await?;
    }

    let repository = Arc::new(MySqlTokenRepository::new(pool.get_pool().clone()));
    let token_service = Arc::new(
        TokenService::new(repository, TokenServiceConfig::from(&config.auth))
            .with_span(info_span!("token_service", environment = %config.environment)),
    );
    token_service.start_sweeper();
    info!(
        sweeper_running = token_service.is_sweeper_running(),
        "Token service ready"
    );

    let state = web::Data::new(AppState::new(token_service.clone()));
    let mut server = HttpServer::new(move || create_app(state.clone()))
        .shutdown_timeout(config.server.shutdown_timeout);
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    info!(address = %config.server.bind_address(), "HTTP server listening");

    // Returns once SIGINT/SIGTERM has drained the workers
    server
        .bind((config.server.host.as_str(), config.server.port))?
        .run()
        .await?;

    info!("HTTP server stopped");

    let grace = Duration::from_secs(config.server.shutdown_timeout);
    if tokio::time::timeout(grace, token_service.shutdown())
        .await
        .is_err()
    {
        warn!(
            timeout_secs = config.server.shutdown_timeout,
            "Token service did not stop in time"
        );
    }

    pool.close().await;
    info!("Auth service stopped");

    Ok(())
}
