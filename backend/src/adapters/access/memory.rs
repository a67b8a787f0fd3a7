//! In-memory board access for tests and single-node demos.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, BoardId, UserId};
use crate::ports::{BoardAccess, BoardAccessChecker};

/// Grants access from an explicit set of (user, board) pairs.
#[derive(Debug, Default)]
pub struct InMemoryBoardAccess {
    grants: RwLock<HashSet<(UserId, BoardId)>>,
    allow_all: bool,
}

impl InMemoryBoardAccess {
    /// Denies everything until grants are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants every user access to every board.
    pub fn allow_all() -> Self {
        Self {
            grants: RwLock::default(),
            allow_all: true,
        }
    }

    pub fn with_grant(self, user_id: &UserId, board_id: &BoardId) -> Self {
        self.grant(user_id, board_id);
        self
    }

    pub fn grant(&self, user_id: &UserId, board_id: &BoardId) {
        self.grants
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((user_id.clone(), *board_id));
    }

    pub fn revoke(&self, user_id: &UserId, board_id: &BoardId) {
        self.grants
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(user_id.clone(), *board_id));
    }
}

#[async_trait]
impl BoardAccessChecker for InMemoryBoardAccess {
    async fn check_board_access(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
    ) -> Result<BoardAccess, AuthError> {
        if self.allow_all {
            return Ok(BoardAccess::Granted);
        }

        let granted = self
            .grants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(user_id.clone(), *board_id));
        Ok(BoardAccess::from(granted))
    }
}
