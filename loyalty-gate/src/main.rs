//! loyalty-gate: authorization service for the loyalty platform
//!
//! Long-running service that:
//! - Resolves the caller from gateway identity headers
//! - Answers shop/permission checks for other platform routes
//! - Throttles sign-in and password reset before forwarding them

use std::net::SocketAddr;

use loyalty_gate::{AppState, Config, api, logger};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    logger::init_logger(config.log_json)?;

    tracing::info!("Starting loyalty-gate (env: {})", config.environment);

    let state = AppState::new(&config)?;

    // Expired rate-limit records
    let sweeper = state
        .rate_limiter
        .spawn_sweeper(config.rate_limit_sweep_interval);

    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("loyalty-gate HTTP listening on {http_addr}");

    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    sweeper.abort();
    if let Err(e) = result {
        tracing::error!("HTTP server error: {e}");
        return Err(e.into());
    }

    tracing::info!("loyalty-gate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
