use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    api::error::{self, constraint},
    modules::{
        friend::{
            model::{
                FriendLinkRow, FriendResponse, Pagination, ResolvedFriendRequest, TwoHopSnapshot,
            },
            repository::{BlockRepository, FriendRepo, FriendRepository, FriendRequestRepository},
            schema::{FriendRequestEntity, FriendRequestStatus},
        },
        user::{repository::UserRepository, schema::UserEntity},
    },
};

#[derive(Default)]
struct MemoryState {
    last_user_id: i64,
    users: BTreeMap<i64, UserEntity>,
    requests: BTreeMap<(i64, i64), FriendRequestEntity>,
    links: BTreeSet<(i64, i64)>,
    blocks: BTreeSet<(i64, i64)>,
}

impl MemoryState {
    fn require_users(&self, table: &str, ids: [i64; 2]) -> Result<(), error::SystemError> {
        if ids.iter().all(|id| self.users.contains_key(id)) {
            return Ok(());
        }
        Err(error::SystemError::DatabaseError(
            format!("insert or update on table \"{table}\" violates foreign key constraint").into(),
        ))
    }

    fn responses(&self, ids: impl Iterator<Item = i64>) -> Vec<FriendResponse> {
        let mut out: Vec<FriendResponse> = ids
            .filter_map(|id| self.users.get(&id))
            .map(|u| FriendResponse { id: u.id, name: u.name.clone() })
            .collect();
        out.sort_by_key(|f| f.id);
        out
    }

    fn outgoing(set: &BTreeSet<(i64, i64)>, owner: i64) -> impl Iterator<Item = i64> + '_ {
        set.range((owner, i64::MIN)..=(owner, i64::MAX)).map(|&(_, other)| other)
    }

    fn pending_ids<'a>(
        &'a self,
        select: impl Fn(&FriendRequestEntity) -> Option<i64> + 'a,
    ) -> impl Iterator<Item = i64> + 'a {
        self.requests
            .values()
            .filter(|r| r.status == FriendRequestStatus::Pending)
            .filter_map(select)
    }
}

/// Process-local store with the same semantics as the PostgreSQL
/// repositories. One mutex guards all tables, so every call is atomic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, error::SystemError> {
        self.state
            .lock()
            .map_err(|_| error::SystemError::InternalError("memory store lock poisoned".into()))
    }

    #[cfg(test)]
    pub fn has_link(&self, user_id: i64, friend_id: i64) -> bool {
        self.lock().map(|s| s.links.contains(&(user_id, friend_id))).unwrap_or(false)
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn create(&self, name: &str) -> Result<UserEntity, error::SystemError> {
        let mut state = self.lock()?;
        state.last_user_id += 1;
        let user = UserEntity {
            id: state.last_user_id,
            name: name.to_string(),
            created_at: chrono::Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<bool, error::SystemError> {
        let mut state = self.lock()?;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        // ON DELETE CASCADE
        state.requests.retain(|&(from, to), _| from != id && to != id);
        state.links.retain(|&(a, b)| a != id && b != id);
        state.blocks.retain(|&(a, b)| a != id && b != id);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl FriendRepository for MemoryStore {
    async fn find_friends(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let state = self.lock()?;
        Ok(state.responses(MemoryState::outgoing(&state.links, user_id)))
    }

    async fn find_friends_paged(
        &self,
        user_id: i64,
        page: &Pagination,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let friends = self.find_friends(user_id).await?;
        Ok(page.apply(friends))
    }

    async fn find_two_hop_snapshot(
        &self,
        user_id: i64,
    ) -> Result<TwoHopSnapshot, error::SystemError> {
        let state = self.lock()?;
        let direct = state.responses(MemoryState::outgoing(&state.links, user_id));
        let blocked = MemoryState::outgoing(&state.blocks, user_id).collect();

        let mut second_hop = Vec::new();
        for owner in &direct {
            for friend in state.responses(MemoryState::outgoing(&state.links, owner.id)) {
                second_hop.push(FriendLinkRow { owner_id: owner.id, id: friend.id, name: friend.name });
            }
        }
        second_hop.sort_by_key(|r| (r.id, r.owner_id));

        Ok(TwoHopSnapshot { direct, blocked, second_hop })
    }

    async fn delete_friendship(
        &self,
        user_id: i64,
        friend_id: i64,
    ) -> Result<(), error::SystemError> {
        let mut state = self.lock()?;
        state.links.remove(&(user_id, friend_id));
        state.links.remove(&(friend_id, user_id));
        Ok(())
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for MemoryStore {
    async fn find_friend_request(
        &self,
        requester_id: i64,
        requested_id: i64,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        Ok(self.lock()?.requests.get(&(requester_id, requested_id)).cloned())
    }

    async fn create_friend_request(
        &self,
        requester_id: i64,
        requested_id: i64,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut state = self.lock()?;
        let key = (requester_id, requested_id);
        if state.requests.contains_key(&key) {
            return Err(error::SystemError::conflict(constraint::FRIEND_REQUESTS_PKEY));
        }
        state.require_users("friend_requests", [requester_id, requested_id])?;

        let now = chrono::Utc::now();
        let request = FriendRequestEntity {
            requester_id,
            requested_id,
            status: FriendRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.requests.insert(key, request.clone());
        Ok(request)
    }

    async fn find_requesters(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let state = self.lock()?;
        let ids = state.pending_ids(move |r| (r.requested_id == user_id).then_some(r.requester_id));
        Ok(state.responses(ids))
    }

    async fn find_requested(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let state = self.lock()?;
        let ids = state.pending_ids(move |r| (r.requester_id == user_id).then_some(r.requested_id));
        Ok(state.responses(ids))
    }
}

#[async_trait::async_trait]
impl BlockRepository for MemoryStore {
    async fn create_block(
        &self,
        blocker_id: i64,
        blocked_id: i64,
    ) -> Result<(), error::SystemError> {
        let mut state = self.lock()?;
        if state.blocks.contains(&(blocker_id, blocked_id)) {
            return Err(error::SystemError::conflict(constraint::BLOCKS_PKEY));
        }
        state.require_users("blocks", [blocker_id, blocked_id])?;
        state.blocks.insert((blocker_id, blocked_id));
        Ok(())
    }

    async fn delete_block(
        &self,
        blocker_id: i64,
        blocked_id: i64,
    ) -> Result<(), error::SystemError> {
        self.lock()?.blocks.remove(&(blocker_id, blocked_id));
        Ok(())
    }

    async fn find_blocked(
        &self,
        blocker_id: i64,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let state = self.lock()?;
        Ok(state.responses(MemoryState::outgoing(&state.blocks, blocker_id)))
    }
}

#[async_trait::async_trait]
impl FriendRepo for MemoryStore {
    async fn resolve_friend_request_atomic(
        &self,
        requester_id: i64,
        requested_id: i64,
        target: FriendRequestStatus,
    ) -> Result<ResolvedFriendRequest, error::SystemError> {
        let mut state = self.lock()?;
        let key = (requester_id, requested_id);

        let current = state
            .requests
            .get(&key)
            .map(|r| r.status)
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;
        let status = current.transition(target)?;
        let requester = state
            .users
            .get(&requester_id)
            .map(|u| FriendResponse::from(u.clone()))
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        if status == FriendRequestStatus::Accepted {
            state.links.insert((requester_id, requested_id));
            state.links.insert((requested_id, requester_id));
        }

        let request = state
            .requests
            .get_mut(&key)
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;
        request.status = status;
        request.updated_at = chrono::Utc::now();
        Ok(ResolvedFriendRequest { request: request.clone(), requester })
    }
}
