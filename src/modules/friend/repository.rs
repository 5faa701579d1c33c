use crate::api::error;
use crate::modules::friend::model::{
    FriendResponse, Pagination, ResolvedFriendRequest, TwoHopSnapshot,
};
use crate::modules::friend::schema::{FriendRequestEntity, FriendRequestStatus};

/// Friend links are stored as two directed rows per friendship. Every list
/// is ordered by friend id ascending.
#[async_trait::async_trait]
pub trait FriendRepository {
    async fn find_friends(&self, user_id: i64)
    -> Result<Vec<FriendResponse>, error::SystemError>;

    async fn find_friends_paged(
        &self,
        user_id: i64,
        page: &Pagination,
    ) -> Result<Vec<FriendResponse>, error::SystemError>;

    /// Direct friends of `user_id`, the users it blocks and the links owned
    /// by each direct friend, all read from one snapshot so that a concurrent
    /// accept, unfriend or block is seen either entirely or not at all.
    async fn find_two_hop_snapshot(
        &self,
        user_id: i64,
    ) -> Result<TwoHopSnapshot, error::SystemError>;

    /// Removes both directions. Removing a missing friendship is not an error.
    async fn delete_friendship(&self, user_id: i64, friend_id: i64)
    -> Result<(), error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRequestRepository {
    async fn find_friend_request(
        &self,
        requester_id: i64,
        requested_id: i64,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn create_friend_request(
        &self,
        requester_id: i64,
        requested_id: i64,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    /// Users with a pending request to `user_id`.
    async fn find_requesters(&self, user_id: i64)
    -> Result<Vec<FriendResponse>, error::SystemError>;

    /// Users `user_id` has a pending request to.
    async fn find_requested(&self, user_id: i64)
    -> Result<Vec<FriendResponse>, error::SystemError>;
}

#[async_trait::async_trait]
pub trait BlockRepository {
    async fn create_block(&self, blocker_id: i64, blocked_id: i64)
    -> Result<(), error::SystemError>;

    async fn delete_block(&self, blocker_id: i64, blocked_id: i64)
    -> Result<(), error::SystemError>;

    async fn find_blocked(&self, blocker_id: i64)
    -> Result<Vec<FriendResponse>, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRepo:
    FriendRepository + FriendRequestRepository + BlockRepository + Send + Sync
{
    /// Moves the request `requester_id -> requested_id` out of pending in a
    /// single transaction. Accepting also inserts both friend link rows.
    /// Nothing is written when the request is missing or not pending.
    async fn resolve_friend_request_atomic(
        &self,
        requester_id: i64,
        requested_id: i64,
        target: FriendRequestStatus,
    ) -> Result<ResolvedFriendRequest, error::SystemError>;
}
