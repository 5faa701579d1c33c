use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};

use crate::api::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "friend_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl FriendRequestStatus {
    /// `pending -> accepted | declined`. Both targets are terminal.
    pub fn transition(
        self,
        target: FriendRequestStatus,
    ) -> Result<FriendRequestStatus, error::SystemError> {
        match (self, target) {
            (FriendRequestStatus::Pending, FriendRequestStatus::Pending) => {
                Err(error::SystemError::invalid_state("Friend request is already pending"))
            }
            (FriendRequestStatus::Pending, next) => Ok(next),
            _ => Err(error::SystemError::invalid_state("Friend request is not pending")),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FriendRequestEntity {
    pub requester_id: i64,
    pub requested_id: i64,
    pub status: FriendRequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::FriendRequestStatus::*;
    use crate::api::error::SystemError;

    #[test]
    fn pending_moves_to_either_terminal_state() {
        assert_eq!(Pending.transition(Accepted).unwrap(), Accepted);
        assert_eq!(Pending.transition(Declined).unwrap(), Declined);
    }

    #[test]
    fn terminal_states_reject_every_transition() {
        for from in [Accepted, Declined] {
            for to in [Pending, Accepted, Declined] {
                assert!(matches!(from.transition(to), Err(SystemError::InvalidState(_))));
            }
        }
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Declined).unwrap(), "\"declined\"");
    }
}
