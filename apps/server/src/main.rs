//! # Tillpoint Server
//!
//! HTTP JSON API for the POS back office.
//!
//! ## Startup Sequence
//! ```text
//! tracing init → config load → SQLite connect + migrate → router → serve
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tillpoint_db::{Database, DbConfig};
use tillpoint_server::config::ServerConfig;
use tillpoint_server::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Tillpoint server...");

    // Load configuration
    let config = ServerConfig::load().context("loading configuration")?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        token_lifetime_secs = config.jwt_lifetime_secs,
        "Configuration loaded"
    );

    // Connect to the database; migrations run on connect
    let db = Database::new(DbConfig::new(&config.database_path))
        .await
        .context("connecting to database")?;
    info!("Connected to SQLite, schema up to date");

    // Build shared state and the router
    let addr = format!("0.0.0.0:{}", config.http_port);
    let state = AppState::new(db, config);
    let router = app(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
