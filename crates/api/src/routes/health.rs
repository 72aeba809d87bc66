use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the queue consumer is polling.
    pub consumer_running: bool,
    /// Number of connected WebSocket clients.
    pub ws_connections: usize,
}

/// GET /health -- returns service and consumer health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let consumer_running = state.poller.is_running();

    let status = if consumer_running { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        consumer_running,
        ws_connections: state.ws_manager.connection_count().await,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
