//! Gateway error types with numeric error codes.
//!
//! [`SignalError`] is the central error type for the signaling protocol.
//! Every variant is user-facing, reported over the WebSocket to the
//! offending connection only, and non-fatal: no variant mutates room
//! state, and the registry stays usable after any per-request failure.

use crate::domain::{ConnectionId, RoomId};

/// Signaling protocol error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category            |
/// |-----------|---------------------|
/// | 1000–1999 | Validation          |
/// | 2000–2999 | Room state          |
#[derive(Debug, Clone, thiserror::Error)]
pub enum SignalError {
    /// A `create` named a key that already names a live room.
    ///
    /// Never reported to clients: the router deliberately takes no action
    /// on this variant (see [`crate::ws::router::SignalingRouter`]).
    #[error("room already exists: {0}")]
    RoomAlreadyExists(RoomId),

    /// A `join` or relay named a room that does not exist.
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),

    /// A `join` named a room that already holds two members.
    #[error("room is full: {0}")]
    RoomFull(RoomId),

    /// A relay came from a connection that is not a member of the named
    /// room.
    #[error("connection {connection_id} is not a member of room {room_id}")]
    MembershipMismatch {
        /// Room the sender claimed.
        room_id: RoomId,
        /// The non-member sender.
        connection_id: ConnectionId,
    },

    /// An inbound frame could not be decoded as a signaling message.
    #[error("malformed message: {0}")]
    MalformedMessage(String),
}

impl SignalError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::MalformedMessage(_) => 1000,
            Self::MembershipMismatch { .. } => 1002,
            Self::RoomNotFound(_) => 2001,
            Self::RoomAlreadyExists(_) => 2002,
            Self::RoomFull(_) => 2003,
        }
    }
}
