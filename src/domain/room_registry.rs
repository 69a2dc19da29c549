//! Concurrent room storage behind a single table-wide lock.
//!
//! [`RoomRegistry`] owns the authoritative room → members mapping. Every
//! mutation (create, join, leave) and every relay-time membership snapshot
//! runs under one [`tokio::sync::Mutex`], so a create/join race on the
//! same key, or a join racing a leave that empties the room, always
//! resolves to a single consistent outcome: no room is ever observed with
//! three members, and no join succeeds against a room that was
//! concurrently deleted.

use std::collections::HashMap;

use tokio::sync::Mutex;

use super::room::Room;
use super::{ConnectionId, RoomId};
use crate::error::SignalError;

/// One room a departing connection was removed from, paired with the
/// members that remain so the router can notify survivors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDeparture {
    /// Key of the affected room.
    pub room_id: RoomId,
    /// Members still present after the removal. Empty when the room was
    /// deleted because the departing connection was its last member.
    pub remaining: Vec<ConnectionId>,
}

/// Central store for all live rooms.
///
/// A room with zero members is never observable here: `leave` deletes a
/// room in the same critical section that empties it.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomId, Room>>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new room with the caller as its sole member.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::RoomAlreadyExists`] if the key already names
    /// a live room; the registry is left untouched in that case.
    pub async fn create(&self, room_id: RoomId, creator: ConnectionId) -> Result<(), SignalError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&room_id) {
            return Err(SignalError::RoomAlreadyExists(room_id));
        }
        rooms.insert(room_id.clone(), Room::new(room_id, creator));
        Ok(())
    }

    /// Adds a connection to an existing room, returning the pre-existing
    /// members so the caller can notify them.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::RoomNotFound`] if no such room exists, or
    /// [`SignalError::RoomFull`] if the room already holds two members.
    pub async fn join(
        &self,
        room_id: &RoomId,
        connection_id: ConnectionId,
    ) -> Result<Vec<ConnectionId>, SignalError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| SignalError::RoomNotFound(room_id.clone()))?;
        if room.is_full() {
            return Err(SignalError::RoomFull(room_id.clone()));
        }
        let existing = room.peers_of(connection_id);
        let _ = room.add_member(connection_id);
        Ok(existing)
    }

    /// Removes a connection from every room it occupies, deleting rooms
    /// that become empty. Returns one [`RoomDeparture`] per affected room.
    ///
    /// The `hint` is the session's cached room key. When it verifies
    /// against the authoritative member set, removal skips the table scan;
    /// a stale or absent hint falls back to scanning every room. Calling
    /// this for a connection that occupies nothing returns an empty vec,
    /// so disconnect handling stays idempotent.
    pub async fn leave(
        &self,
        connection_id: ConnectionId,
        hint: Option<&RoomId>,
    ) -> Vec<RoomDeparture> {
        let mut rooms = self.rooms.lock().await;

        if let Some(room_id) = hint
            && let Some(room) = rooms.get_mut(room_id)
            && room.remove_member(connection_id)
        {
            let departure = RoomDeparture {
                room_id: room_id.clone(),
                remaining: room.members().to_vec(),
            };
            if room.is_empty() {
                rooms.remove(room_id);
            }
            return vec![departure];
        }

        let mut departures = Vec::new();
        rooms.retain(|room_id, room| {
            if room.remove_member(connection_id) {
                departures.push(RoomDeparture {
                    room_id: room_id.clone(),
                    remaining: room.members().to_vec(),
                });
            }
            !room.is_empty()
        });
        departures
    }

    /// Returns the relay recipients for a message from `sender` into
    /// `room_id`: every current member except the sender, snapshotted
    /// atomically with respect to concurrent leaves.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::RoomNotFound`] if the room does not exist,
    /// or [`SignalError::MembershipMismatch`] if the sender is not a
    /// current member of it.
    pub async fn relay_targets(
        &self,
        room_id: &RoomId,
        sender: ConnectionId,
    ) -> Result<Vec<ConnectionId>, SignalError> {
        let rooms = self.rooms.lock().await;
        let room = rooms
            .get(room_id)
            .ok_or_else(|| SignalError::RoomNotFound(room_id.clone()))?;
        if !room.contains(sender) {
            return Err(SignalError::MembershipMismatch {
                room_id: room_id.clone(),
                connection_id: sender,
            });
        }
        Ok(room.peers_of(sender))
    }

    /// Returns a snapshot of a room's member set, or `None` if the room
    /// does not exist.
    pub async fn members(&self, room_id: &RoomId) -> Option<Vec<ConnectionId>> {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).map(|room| room.members().to_vec())
    }

    /// Returns the number of live rooms.
    pub async fn len(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// Returns `true` if no rooms are live.
    pub async fn is_empty(&self) -> bool {
        self.rooms.lock().await.is_empty()
    }
}
