//! Moviez Server: movie catalog and seat reservation backend.
//!
//! Main entry point that wires all crates together and starts the server.

use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use moviez_core::config::AppConfig;
use moviez_core::error::AppError;
use moviez_database::Stores;

#[tokio::main]
async fn main() {
    let env = std::env::var("MOVIEZ_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Moviez v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Storage backend (+ migrations) ───────────────────
    tracing::info!(backend = ?config.database.backend, "Opening stores...");
    let stores = Stores::connect(&config.database).await?;

    // ── Step 2: Services, bootstrap admin ────────────────────────
    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = moviez_api::build_state(config, stores.clone()).await?;

    // ── Step 3: Build and start HTTP server ──────────────────────
    let app = moviez_api::build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Moviez server listening on {}", addr);

    // ── Step 4: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 5: Release storage ──────────────────────────────────
    if tokio::time::timeout(grace, stores.close()).await.is_err() {
        tracing::warn!(grace_seconds = grace.as_secs(), "Timed out closing stores");
    }

    tracing::info!("Moviez server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
