//! REST API layer: read-only status endpoints and router composition.
//!
//! The signaling protocol itself lives entirely on the WebSocket; the
//! REST surface is limited to operational reporting.

pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Builds the REST router with all endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new().merge(system::routes())
}
