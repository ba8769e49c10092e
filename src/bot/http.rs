//! HTTP one-batch endpoint
//!
//! For deployments where a scheduler triggers processing instead of a
//! long-lived poller. Each request runs exactly one dispatcher batch.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use crate::config::HttpConfig;
use crate::utils::errors::{LiraError, Result};
use super::dispatcher::UpdateDispatcher;

#[derive(Clone)]
pub struct HttpState {
    dispatcher: Arc<UpdateDispatcher>,
    /// Held while a batch runs; a second caller gets 409
    batch_lock: Arc<Mutex<()>>,
}

impl HttpState {
    pub fn new(dispatcher: Arc<UpdateDispatcher>) -> Self {
        Self {
            dispatcher,
            batch_lock: Arc::new(Mutex::new(())),
        }
    }
}

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/telegram/poll", get(poll_once).post(poll_once))
        .route("/health", get(health))
        .with_state(state)
}

/// Process one batch and report its counts
pub async fn poll_once(State(state): State<HttpState>) -> (StatusCode, Json<Value>) {
    let Ok(_running) = state.batch_lock.try_lock() else {
        warn!("Poll request rejected, a batch is already running");
        return (
            StatusCode::CONFLICT,
            Json(json!({ "status": "busy", "error": "a batch is already running" })),
        );
    };

    match state.dispatcher.run_once().await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "processed": report.processed,
                "skipped": report.skipped,
                "failed": report.failed,
                "total_updates": report.total_updates,
                "cursor": report.cursor,
            })),
        ),
        Err(e) => {
            if e.is_conflict() {
                state.dispatcher.reset_cursor_cache().await;
            }
            error!(error = %e, "Poll request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "error": e.to_string() })),
            )
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Serve the router until `shutdown` resolves
pub async fn serve<F>(config: &HttpConfig, state: HttpState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address: SocketAddr = config
        .bind_address
        .parse()
        .map_err(|e| LiraError::Config(format!("Invalid bind address '{}': {}", config.bind_address, e)))?;

    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("📡 Listening on: {}", address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
