//! # signal-gateway
//!
//! WebSocket signaling gateway for two-party WebRTC session negotiation.
//!
//! Two otherwise-unconnected clients rendezvous through a shared room
//! key, exchange opaque session-description and ICE-candidate payloads,
//! and are cleanly disconnected when either side leaves. The gateway
//! never interprets the negotiation payloads — SDP and ICE semantics
//! belong entirely to the clients' media stacks — it only routes them.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket, HTTP health)
//!     │
//!     ├── WS connection loop (ws/connection)
//!     ├── SignalingRouter (ws/router)
//!     │
//!     ├── RoomRegistry (domain/)
//!     ├── PeerMap (ws/peers)
//!     │
//!     └── REST status (api/)
//! ```
//!
//! All room state is process-lifetime only; nothing is persisted.

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod ws;
