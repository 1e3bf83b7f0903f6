//! Server startup and graceful shutdown.

use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;

/// Start the server with graceful shutdown. On shutdown the verification
/// queue is drained before the process exits so no document is left stuck
/// in PROCESSING by a clean restart.
pub async fn start_server(state: Arc<AppState>, app: Router) -> Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        max_upload_mb = state.config.max_upload_bytes / 1024 / 1024,
        allowed_types = %state.config.allowed_mime_types.join(","),
        auto_verification = state.config.auto_verification_enabled,
        verification_workers = state.config.verification_workers,
        storage = ?state.storage.backend_type(),
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Draining verification queue...");
    state.queue.shutdown().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Signal handler for graceful shutdown.
///
/// Listens for Ctrl+C (SIGINT) and SIGTERM signals.
///
/// # Panics
/// - Panics if Ctrl+C signal handler cannot be installed (unrecoverable system error)
/// - On Unix systems, panics if SIGTERM signal handler cannot be installed (unrecoverable system error)
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
