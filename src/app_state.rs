//! Shared application state injected into all Axum handlers.

use chrono::{DateTime, Utc};

use crate::ws::router::SignalingRouter;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Signaling router shared by every connection task.
    pub router: SignalingRouter,
    /// Instant the gateway started, for uptime reporting.
    pub started_at: DateTime<Utc>,
}
