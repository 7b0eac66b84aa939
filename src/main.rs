//! Cachekeeper admin server
//!
//! Composition root: builds the application stores, the memory guardian and
//! the admin HTTP API around them.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cachekeeper::api::create_router;
use cachekeeper::{AppState, Config, MemoryGuardian};

/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register the default stores and create the guardian
/// 4. Start the guardian if enabled
/// 5. Serve the admin API until SIGINT/SIGTERM, then stop the guardian
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cachekeeper=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cachekeeper");

    let config = Config::from_env();
    info!(
        max_entries = config.max_entries,
        default_ttl_secs = config.default_ttl,
        port = config.server_port,
        cleanup_interval_secs = config.cleanup_interval,
        memory_budget_mb = config.memory_budget_mb,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config);
    info!(stores = ?state.registry.names(), "Cache stores initialized");

    if config.guardian_enabled {
        let mut guardian = state.guardian.lock().await;
        if guardian.start(state.registry.clone(), config.cleanup_interval()) {
            info!("Memory guardian started");
        }
    }

    let guardian = state.guardian.clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(guardian))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the guardian.
async fn shutdown_signal(guardian: Arc<Mutex<MemoryGuardian>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    guardian.lock().await.stop();
}
