//! HTTP server implementation for the journal.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use tokio::signal;

use super::config::JournalServerConfig;
use super::handlers::{
    AppState, handle_entries, handle_healthy, handle_metrics, handle_missing_scope, handle_ready,
};
use super::metrics::Metrics;
use super::middleware::{record_metrics, trace_requests};
use crate::JournalDb;

/// Routes serving journal entries under `/route/`.
///
/// The returned router carries its own state and middleware, so a host
/// application can `merge` it into its own router and only `/route/...`
/// requests reach the journal.
pub fn journal_router(state: AppState) -> Router {
    let metrics = Arc::clone(&state.metrics);
    Router::new()
        .route("/route", get(handle_missing_scope))
        .route("/route/", get(handle_missing_scope))
        .route("/route/{scope}", get(handle_entries))
        .layer(from_fn(trace_requests))
        .layer(from_fn_with_state(metrics, record_metrics))
        .with_state(state)
}

/// Operational routes: metrics and health probes.
pub fn operations_router(state: AppState) -> Router {
    let metrics = Arc::clone(&state.metrics);
    Router::new()
        .route("/metrics", get(handle_metrics))
        .route("/-/healthy", get(handle_healthy))
        .route("/-/ready", get(handle_ready))
        .layer(from_fn(trace_requests))
        .layer(from_fn_with_state(metrics, record_metrics))
        .with_state(state)
}

/// HTTP server for the journal service.
pub struct JournalServer {
    journal: Arc<JournalDb>,
    config: JournalServerConfig,
}

impl JournalServer {
    /// Create a new journal server.
    pub fn new(journal: Arc<JournalDb>, config: JournalServerConfig) -> Self {
        Self { journal, config }
    }

    /// Builds the full application router.
    pub fn router(&self, metrics: Arc<Metrics>) -> Router {
        let state = AppState::new(Arc::clone(&self.journal), metrics);
        journal_router(state.clone()).merge(operations_router(state))
    }

    /// Run the HTTP server until SIGINT or SIGTERM, then close the journal.
    pub async fn run(self) -> std::io::Result<()> {
        let app = self.router(Arc::new(Metrics::new()));

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        tracing::info!("Starting journal HTTP server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Closing journal storage...");
        if let Err(e) = self.journal.close().await {
            tracing::error!("Failed to close journal on shutdown: {}", e);
        }

        tracing::info!("Server shut down gracefully");
        Ok(())
    }
}

/// Listen for SIGTERM (K8s pod termination) and SIGINT (Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
