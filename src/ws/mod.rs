//! WebSocket layer: connection handling, message routing, sessions.
//!
//! The WebSocket endpoint at `/ws` carries the entire signaling protocol:
//! room create/join/hangup plus verbatim relay of offer, answer, and ICE
//! candidate payloads between the two members of a room.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod peers;
pub mod router;
pub mod session;
