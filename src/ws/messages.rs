//! Signaling wire messages.
//!
//! Both directions use internally-tagged JSON (`"type"` discriminator,
//! kebab-case tags, camelCase fields). SDP and ICE payloads are carried as
//! opaque [`serde_json::Value`]s: the gateway routes them verbatim and
//! never inspects their content.

use serde::{Deserialize, Serialize};

use crate::domain::{ConnectionId, RoomId};
use crate::error::SignalError;

/// Messages a client sends to the gateway.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Create a room. Without a key the server generates one.
    Create {
        /// Client-chosen room key, if any.
        #[serde(default)]
        room_id: Option<RoomId>,
    },
    /// Join an existing room.
    Join {
        /// Key of the room to join.
        room_id: RoomId,
    },
    /// Session-description offer to relay to the other member.
    Offer {
        /// Room the offer belongs to.
        room_id: RoomId,
        /// Opaque session description.
        sdp: serde_json::Value,
    },
    /// Session-description answer to relay to the other member.
    Answer {
        /// Room the answer belongs to.
        room_id: RoomId,
        /// Opaque session description.
        sdp: serde_json::Value,
    },
    /// Connectivity candidate to relay to the other member.
    IceCandidate {
        /// Room the candidate belongs to.
        room_id: RoomId,
        /// Opaque candidate payload.
        candidate: serde_json::Value,
    },
    /// Leave the named room while keeping the signaling channel open.
    Hangup {
        /// Key of the room being left.
        room_id: RoomId,
    },
}

/// Messages the gateway sends to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// The caller's `create` succeeded.
    Created {
        /// Key of the new room.
        room_id: RoomId,
    },
    /// The caller's `join` succeeded.
    Joined {
        /// Key of the joined room.
        room_id: RoomId,
    },
    /// Another connection joined the recipient's room.
    PeerJoined {
        /// Identity of the new member.
        connection_id: ConnectionId,
    },
    /// Relayed session-description offer.
    Offer {
        /// Room the offer belongs to.
        room_id: RoomId,
        /// Opaque session description, forwarded unchanged.
        sdp: serde_json::Value,
    },
    /// Relayed session-description answer.
    Answer {
        /// Room the answer belongs to.
        room_id: RoomId,
        /// Opaque session description, forwarded unchanged.
        sdp: serde_json::Value,
    },
    /// Relayed connectivity candidate.
    IceCandidate {
        /// Room the candidate belongs to.
        room_id: RoomId,
        /// Opaque candidate payload, forwarded unchanged.
        candidate: serde_json::Value,
    },
    /// The other member left the recipient's room.
    PeerDisconnected {
        /// Identity of the departed member.
        connection_id: ConnectionId,
    },
    /// A request failed; reported to the offending connection only.
    Error {
        /// Numeric error code (see [`SignalError::error_code`]).
        code: u32,
        /// Human-readable error message.
        message: String,
    },
}

impl From<&SignalError> for ServerMessage {
    fn from(err: &SignalError) -> Self {
        Self::Error {
            code: err.error_code(),
            message: err.to_string(),
        }
    }
}
