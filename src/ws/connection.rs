//! WebSocket connection loop.
//!
//! Runs the read/write task for a single signaling connection: inbound
//! frames are decoded and dispatched through the [`SignalingRouter`],
//! outbound messages drain from this connection's queue in the
//! [`super::peers::PeerMap`]. One task per connection; the queue is the
//! only ordering boundary, so each recipient sees messages in emission
//! order.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::domain::ConnectionId;
use crate::ws::messages::ClientMessage;
use crate::ws::router::SignalingRouter;
use crate::ws::session::ConnectionSession;

/// Runs the read/write loop for one upgraded WebSocket.
///
/// Registers the connection's outbound queue, then services the socket
/// until the client closes or the stream errors. On exit the queue is
/// unregistered and the router runs disconnect cleanup, so a connection
/// can never leave a room half-populated.
pub async fn run_connection(socket: WebSocket, router: SignalingRouter) {
    let connection_id = ConnectionId::new();
    let mut session = ConnectionSession::new(connection_id);

    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    router.peers().register(connection_id, out_tx).await;
    tracing::info!(%connection_id, "client connected");

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // Incoming frame from the client.
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(message) => router.dispatch(&mut session, message).await,
                            Err(err) => {
                                router.on_malformed(connection_id, err.to_string()).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
            // Outbound message queued for this connection.
            outbound = out_rx.recv() => {
                match outbound {
                    Some(message) => {
                        let json = serde_json::to_string(&message).unwrap_or_default();
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    router.peers().unregister(connection_id).await;
    router.on_transport_close(&mut session).await;
    tracing::info!(%connection_id, "client disconnected");
}
