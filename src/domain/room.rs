//! A two-seat rendezvous room.
//!
//! [`Room`] tracks the member set for one room key. Member order carries
//! exactly one meaning: the first member is the room's implicit creator
//! and offerer. All mutation happens under the [`super::RoomRegistry`]
//! lock; `Room` itself is plain data.

use super::ConnectionId;
use super::RoomId;

/// Maximum number of members a room may hold.
pub const ROOM_CAPACITY: usize = 2;

/// One live room: a key plus at most [`ROOM_CAPACITY`] members.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    members: Vec<ConnectionId>,
}

impl Room {
    /// Creates a room with its creator as the sole member.
    #[must_use]
    pub fn new(id: RoomId, creator: ConnectionId) -> Self {
        Self {
            id,
            members: vec![creator],
        }
    }

    /// Returns the room key.
    #[must_use]
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Returns the current member set, creation order preserved.
    #[must_use]
    pub fn members(&self) -> &[ConnectionId] {
        &self.members
    }

    /// Returns `true` if the connection is a current member.
    #[must_use]
    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.members.contains(&connection_id)
    }

    /// Returns `true` if the room has reached [`ROOM_CAPACITY`].
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.members.len() >= ROOM_CAPACITY
    }

    /// Returns `true` if the room has no members left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Adds a member. Returns `false` without mutating when the room is
    /// full or the connection is already a member.
    pub fn add_member(&mut self, connection_id: ConnectionId) -> bool {
        if self.is_full() || self.contains(connection_id) {
            return false;
        }
        self.members.push(connection_id);
        true
    }

    /// Removes a member. Returns `false` when the connection was not a
    /// member, which callers treat as a no-op.
    pub fn remove_member(&mut self, connection_id: ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != connection_id);
        self.members.len() != before
    }

    /// Returns every member except the given connection.
    #[must_use]
    pub fn peers_of(&self, connection_id: ConnectionId) -> Vec<ConnectionId> {
        self.members
            .iter()
            .copied()
            .filter(|m| *m != connection_id)
            .collect()
    }
}
