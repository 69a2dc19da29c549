//! Room identifier.
//!
//! [`RoomId`] is a newtype wrapper around the opaque string key two peers
//! share out of band to find each other. Clients usually supply it; the
//! server generates a UUID v4 string when a `create` arrives without one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque string key naming a rendezvous room.
///
/// The gateway never interprets the content beyond equality and hashing.
/// Used as the dictionary key in [`super::RoomRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps a client-supplied room key.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh server-side room key (UUID v4 string).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the room key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
