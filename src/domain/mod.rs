//! Domain layer: room identity, membership, and the room registry.
//!
//! This module contains the server-side domain model: room and connection
//! identifiers, the two-seat [`Room`] itself, and the [`RoomRegistry`]
//! that owns the authoritative room → members mapping.

pub mod connection_id;
pub mod room;
pub mod room_id;
pub mod room_registry;

pub use connection_id::ConnectionId;
pub use room::Room;
pub use room_id::RoomId;
pub use room_registry::{RoomDeparture, RoomRegistry};
