//! Per-connection room bookkeeping.
//!
//! [`ConnectionSession`] caches which room (if any) a connection
//! currently occupies, so disconnect handling can hand the registry a
//! lookup hint instead of forcing a table scan. The cache is never
//! authoritative: on any discrepancy the registry's member set wins.

use crate::domain::{ConnectionId, RoomId};

/// Transport-connection context: identity plus at most one current room.
#[derive(Debug)]
pub struct ConnectionSession {
    connection_id: ConnectionId,
    current_room: Option<RoomId>,
}

impl ConnectionSession {
    /// Creates a session for a freshly upgraded connection.
    #[must_use]
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            current_room: None,
        }
    }

    /// Returns this connection's identity.
    #[must_use]
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Returns the cached current room, if any.
    #[must_use]
    pub fn current_room(&self) -> Option<&RoomId> {
        self.current_room.as_ref()
    }

    /// Records a successful create/join into `room_id`.
    pub fn enter(&mut self, room_id: RoomId) {
        self.current_room = Some(room_id);
    }

    /// Clears the cache after a leave or hangup, returning the old value.
    pub fn clear(&mut self) -> Option<RoomId> {
        self.current_room.take()
    }
}
