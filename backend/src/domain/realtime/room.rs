//! Room identifiers and the room-naming convention.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{BoardId, UserId, ValidationError};

/// Prefix that marks a personal notification room.
///
/// External publishers address user rooms with this exact prefix, so it
/// must never change.
pub const USER_ROOM_PREFIX: &str = "user:";

/// Opaque key of a multicast group.
///
/// Board rooms use the board's identifier verbatim; personal rooms are
/// `user:<user id>`. Rooms have no lifecycle of their own: the hub creates an
/// entry on first subscription and removes it when the last subscriber leaves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Creates a room id from a raw key, rejecting empty keys.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ValidationError::empty_field("room"));
        }
        Ok(Self(raw))
    }

    /// The room shared by everyone viewing a board.
    pub fn board(board_id: &BoardId) -> Self {
        Self(board_id.to_string())
    }

    /// The personal notification room of a user.
    pub fn user(user_id: &UserId) -> Self {
        Self(format!("{}{}", USER_ROOM_PREFIX, user_id.as_str()))
    }

    /// Returns the raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this is a personal room.
    pub fn is_user_room(&self) -> bool {
        self.0.starts_with(USER_ROOM_PREFIX)
    }

    /// The owning user for personal rooms.
    pub fn user_id(&self) -> Option<UserId> {
        self.0
            .strip_prefix(USER_ROOM_PREFIX)
            .and_then(|id| UserId::new(id).ok())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
