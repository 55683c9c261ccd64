use std::sync::Arc;

use anyhow::Context;
use payments_api::{
    app::{self, AppState},
    auth::TokenIssuer,
    config::AppConfig,
    database::{DatabaseManager, PgPaymentDebtRepository, PgUserRepository},
    storage::create_object_store,
    types::system_clock,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, RUST_LOG, etc.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_filter())))
        .init();

    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }

    let config = AppConfig::from_env()?;
    tracing::info!("Starting Payments API in {:?} mode", config.environment);

    // Lazy pool: the server comes up without a database and /health reports it
    let pool = DatabaseManager::connect_lazy(&config.database)?;
    tracing::info!("Database: {}", config.redacted_database_url());

    let storage = create_object_store(&config.storage).await?;
    tracing::info!(
        "Object storage: {} (bucket '{}', pre-signed URL TTL {}s)",
        storage.backend_name(),
        config.storage.bucket,
        config.storage.presigned_url_ttl_secs
    );

    let state = AppState {
        tokens: TokenIssuer::new(&config.security)?,
        debts: Arc::new(PgPaymentDebtRepository::new(pool.clone())),
        users: Arc::new(PgUserRepository::new(pool.clone())),
        storage,
        clock: system_clock,
        config: Arc::new(config),
    };

    let bind_addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Payments API listening on http://{}", bind_addr);

    axum::serve(listener, app::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    DatabaseManager::close(&pool).await;
    Ok(())
}

/// `debug` for this crate unless DEBUG is off or the preset is staging/production.
fn default_log_filter() -> &'static str {
    let preset = std::env::var("APP_ENV").or_else(|_| std::env::var("ENV")).unwrap_or_default();
    let debug = std::env::var("DEBUG")
        .ok()
        .and_then(|v| v.trim().parse::<bool>().ok())
        .unwrap_or(!matches!(preset.as_str(), "production" | "prod" | "staging" | "stage"));

    if debug {
        "payments_api=debug,tower_http=debug,info"
    } else {
        "info"
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
