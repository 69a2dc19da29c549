//! signal-gateway server entry point.
//!
//! Starts the Axum HTTP server with the signaling WebSocket endpoint and
//! the health endpoint, and shuts down gracefully on ctrl-c.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use signal_gateway::api;
use signal_gateway::app_state::AppState;
use signal_gateway::config::GatewayConfig;
use signal_gateway::domain::RoomRegistry;
use signal_gateway::ws::handler::ws_handler;
use signal_gateway::ws::peers::PeerMap;
use signal_gateway::ws::router::SignalingRouter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!(addr = %config.listen_addr, "starting signal-gateway");

    // Build the signaling core
    let registry = Arc::new(RoomRegistry::new());
    let router = SignalingRouter::new(registry, PeerMap::new());

    let app_state = AppState {
        router,
        started_at: chrono::Utc::now(),
    };

    // CORS: lock to the configured origin in production, permissive otherwise
    let cors = match config.allowed_origin.as_deref() {
        Some(origin) => {
            let origin: HeaderValue = origin
                .parse()
                .map_err(|_| anyhow::anyhow!("ALLOWED_ORIGIN is not a valid header value"))?;
            CorsLayer::new().allow_origin(origin).allow_methods(Any)
        }
        None => CorsLayer::permissive(),
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves when the process receives ctrl-c (or SIGTERM on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                let _ = sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
