//! Board access port used at admission time.
//!
//! The hub trusts the room list it is given completely. This port is where
//! the admission adapter asks the board service whether a user may watch a
//! board, before any connection is created.
//!
//! # Design
//!
//! Fail-secure: callers treat any error as a refusal to join.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, BoardId, UserId};

/// Outcome of a board access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAccess {
    Granted,
    Denied,
}

impl BoardAccess {
    /// Returns true if access is granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, BoardAccess::Granted)
    }
}

impl From<bool> for BoardAccess {
    fn from(granted: bool) -> Self {
        if granted {
            BoardAccess::Granted
        } else {
            BoardAccess::Denied
        }
    }
}

/// Port for checking whether a user can view a board.
#[async_trait]
pub trait BoardAccessChecker: Send + Sync {
    /// Check if `user_id` may subscribe to `board_id`'s room.
    ///
    /// Returns `AuthError::ServiceUnavailable` if the answer cannot be
    /// determined.
    async fn check_board_access(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
    ) -> Result<BoardAccess, AuthError>;
}
