//! System endpoints: health and status reporting.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    /// Number of live rooms.
    rooms: usize,
    /// Number of connected signaling clients.
    connections: usize,
    /// Seconds since the gateway started.
    uptime_secs: i64,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health, live room and connection counts, uptime, and version.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(state: axum::extract::State<AppState>) -> impl IntoResponse {
    let rooms = state.router.registry().len().await;
    let connections = state.router.peers().len().await;
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            rooms,
            connections,
            uptime_secs: (Utc::now() - state.started_at).num_seconds(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
