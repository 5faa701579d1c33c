use std::sync::Arc;

use log::info;

use crate::{
    api::error,
    modules::{
        friend::{
            graph,
            model::{FriendResponse, Pagination},
            repository::FriendRepo,
            schema::{FriendRequestEntity, FriendRequestStatus},
        },
        user::repository::UserRepository,
    },
};

#[derive(Clone)]
pub struct FriendService {
    friend_repo: Arc<dyn FriendRepo>,
    user_repo: Arc<dyn UserRepository + Send + Sync>,
}

impl FriendService {
    pub fn with_dependencies(
        friend_repo: Arc<dyn FriendRepo>,
        user_repo: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        info!("FriendService initialized with dependencies");
        FriendService { friend_repo, user_repo }
    }

    async fn require_users(&self, user_id: i64, other_id: i64) -> Result<(), error::SystemError> {
        let (user, other) = tokio::try_join!(
            self.user_repo.find_by_id(user_id),
            self.user_repo.find_by_id(other_id),
        )?;
        if user.is_none() || other.is_none() {
            return Err(error::SystemError::not_found("User not found"));
        }
        Ok(())
    }

    pub async fn send_friend_request(
        &self,
        requester_id: i64,
        requested_id: i64,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.require_users(requester_id, requested_id).await?;

        let request = self.friend_repo.create_friend_request(requester_id, requested_id).await?;
        info!("Friend request {} -> {} created", requester_id, requested_id);
        Ok(request)
    }

    pub async fn get_friend_request(
        &self,
        requester_id: i64,
        requested_id: i64,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.friend_repo
            .find_friend_request(requester_id, requested_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))
    }

    pub async fn get_requesters(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        self.friend_repo.find_requesters(user_id).await
    }

    pub async fn get_requested(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        self.friend_repo.find_requested(user_id).await
    }

    /// `user_id` accepts the pending request sent by `friend_id`.
    pub async fn accept_friend_request(
        &self,
        user_id: i64,
        friend_id: i64,
    ) -> Result<FriendResponse, error::SystemError> {
        let resolved = self
            .friend_repo
            .resolve_friend_request_atomic(friend_id, user_id, FriendRequestStatus::Accepted)
            .await?;
        info!("Friend request {} -> {} accepted", friend_id, user_id);

        Ok(resolved.requester)
    }

    /// `user_id` declines the pending request sent by `friend_id`.
    pub async fn decline_friend_request(
        &self,
        user_id: i64,
        friend_id: i64,
    ) -> Result<(), error::SystemError> {
        self.friend_repo
            .resolve_friend_request_atomic(friend_id, user_id, FriendRequestStatus::Declined)
            .await?;
        info!("Friend request {} -> {} declined", friend_id, user_id);
        Ok(())
    }

    pub async fn get_friends(
        &self,
        user_id: i64,
        page: Option<Pagination>,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        match page {
            Some(page) => self.friend_repo.find_friends_paged(user_id, &page).await,
            None => self.friend_repo.find_friends(user_id).await,
        }
    }

    pub async fn get_friends_of_friends(
        &self,
        user_id: i64,
        page: Option<Pagination>,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let snapshot = self.friend_repo.find_two_hop_snapshot(user_id).await?;
        let candidates = graph::friends_of_friends(
            user_id,
            &snapshot.direct,
            snapshot.second_hop,
            &snapshot.blocked,
        );
        Ok(match page {
            Some(page) => page.apply(candidates),
            None => candidates,
        })
    }

    pub async fn remove_friend(&self, user_id: i64, friend_id: i64) -> Result<(), error::SystemError> {
        self.friend_repo.delete_friendship(user_id, friend_id).await?;
        info!("Friendship {} <-> {} removed", user_id, friend_id);
        Ok(())
    }

    pub async fn block_user(&self, user_id: i64, block_id: i64) -> Result<(), error::SystemError> {
        self.require_users(user_id, block_id).await?;
        self.friend_repo.create_block(user_id, block_id).await?;
        info!("User {} blocked {}", user_id, block_id);
        Ok(())
    }

    pub async fn unblock_user(&self, user_id: i64, block_id: i64) -> Result<(), error::SystemError> {
        self.friend_repo.delete_block(user_id, block_id).await?;
        info!("User {} unblocked {}", user_id, block_id);
        Ok(())
    }

    pub async fn get_blocked(&self, user_id: i64) -> Result<Vec<FriendResponse>, error::SystemError> {
        self.friend_repo.find_blocked(user_id).await
    }
}
