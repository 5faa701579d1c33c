use crate::{
    api::error,
    modules::friend::{
        model::{
            FriendLinkRow, FriendResponse, Pagination, ResolvedFriendRequest, TwoHopSnapshot,
        },
        repository::{BlockRepository, FriendRepo, FriendRepository, FriendRequestRepository},
        schema::{FriendRequestEntity, FriendRequestStatus},
    },
};

const REQUEST_COLUMNS: &str = "requester_id, requested_id, status, created_at, updated_at";

const FRIENDS_QUERY: &str = r#"
    SELECT u.id, u.name
    FROM friend_links fl
    JOIN users u ON u.id = fl.friend_id
    WHERE fl.user_id = $1
    ORDER BY u.id
"#;

#[derive(Clone)]
pub struct FriendRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FriendRepository for FriendRepositoryPg {
    async fn find_friends(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let friends = sqlx::query_as::<_, FriendResponse>(FRIENDS_QUERY)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(friends)
    }

    async fn find_friends_paged(
        &self,
        user_id: i64,
        page: &Pagination,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let friends = sqlx::query_as::<_, FriendResponse>(
            r#"
            SELECT u.id, u.name
            FROM friend_links fl
            JOIN users u ON u.id = fl.friend_id
            WHERE fl.user_id = $1
            ORDER BY u.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }

    async fn find_two_hop_snapshot(
        &self,
        user_id: i64,
    ) -> Result<TwoHopSnapshot, error::SystemError> {
        let mut tx = self.pool.begin().await?;
        // All three reads share the snapshot taken by the first one.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let direct = sqlx::query_as::<_, FriendResponse>(FRIENDS_QUERY)
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await?;

        let blocked = sqlx::query_scalar::<_, i64>(
            "SELECT blocked_id FROM blocks WHERE blocker_id = $1",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        let second_hop = sqlx::query_as::<_, FriendLinkRow>(
            r#"
            SELECT fl.user_id AS owner_id, u.id, u.name
            FROM friend_links seed
            JOIN friend_links fl ON fl.user_id = seed.friend_id
            JOIN users u ON u.id = fl.friend_id
            WHERE seed.user_id = $1
            ORDER BY u.id, fl.user_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(TwoHopSnapshot { direct, blocked: blocked.into_iter().collect(), second_hop })
    }

    async fn delete_friendship(
        &self,
        user_id: i64,
        friend_id: i64,
    ) -> Result<(), error::SystemError> {
        sqlx::query(
            r#"
            DELETE FROM friend_links
            WHERE (user_id = $1 AND friend_id = $2)
               OR (user_id = $2 AND friend_id = $1)
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for FriendRepositoryPg {
    async fn find_friend_request(
        &self,
        requester_id: i64,
        requested_id: i64,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM friend_requests WHERE requester_id = $1 AND requested_id = $2"
        ))
        .bind(requester_id)
        .bind(requested_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn create_friend_request(
        &self,
        requester_id: i64,
        requested_id: i64,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(&format!(
            "INSERT INTO friend_requests (requester_id, requested_id) VALUES ($1, $2) RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(requester_id)
        .bind(requested_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_requesters(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let requesters = sqlx::query_as::<_, FriendResponse>(
            r#"
            SELECT u.id, u.name
            FROM friend_requests fr
            JOIN users u ON u.id = fr.requester_id
            WHERE fr.requested_id = $1
              AND fr.status = $2
            ORDER BY u.id
            "#,
        )
        .bind(user_id)
        .bind(FriendRequestStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(requesters)
    }

    async fn find_requested(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let requested = sqlx::query_as::<_, FriendResponse>(
            r#"
            SELECT u.id, u.name
            FROM friend_requests fr
            JOIN users u ON u.id = fr.requested_id
            WHERE fr.requester_id = $1
              AND fr.status = $2
            ORDER BY u.id
            "#,
        )
        .bind(user_id)
        .bind(FriendRequestStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(requested)
    }
}

#[async_trait::async_trait]
impl BlockRepository for FriendRepositoryPg {
    async fn create_block(
        &self,
        blocker_id: i64,
        blocked_id: i64,
    ) -> Result<(), error::SystemError> {
        sqlx::query("INSERT INTO blocks (blocker_id, blocked_id) VALUES ($1, $2)")
            .bind(blocker_id)
            .bind(blocked_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_block(
        &self,
        blocker_id: i64,
        blocked_id: i64,
    ) -> Result<(), error::SystemError> {
        sqlx::query("DELETE FROM blocks WHERE blocker_id = $1 AND blocked_id = $2")
            .bind(blocker_id)
            .bind(blocked_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_blocked(
        &self,
        blocker_id: i64,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let blocked = sqlx::query_as::<_, FriendResponse>(
            r#"
            SELECT u.id, u.name
            FROM blocks b
            JOIN users u ON u.id = b.blocked_id
            WHERE b.blocker_id = $1
            ORDER BY u.id
            "#,
        )
        .bind(blocker_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(blocked)
    }
}

#[async_trait::async_trait]
impl FriendRepo for FriendRepositoryPg {
    async fn resolve_friend_request_atomic(
        &self,
        requester_id: i64,
        requested_id: i64,
        target: FriendRequestStatus,
    ) -> Result<ResolvedFriendRequest, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, FriendRequestEntity>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM friend_requests WHERE requester_id = $1 AND requested_id = $2 FOR UPDATE"
        ))
        .bind(requester_id)
        .bind(requested_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(request) = request else {
            tx.rollback().await?;
            return Err(error::SystemError::not_found("Friend request not found"));
        };

        let status = match request.status.transition(target) {
            Ok(status) => status,
            Err(err) => {
                tx.rollback().await?;
                return Err(err);
            }
        };

        // The locked request row holds off a cascading delete of the requester.
        let requester =
            sqlx::query_as::<_, FriendResponse>("SELECT id, name FROM users WHERE id = $1")
                .bind(requester_id)
                .fetch_one(&mut *tx)
                .await?;

        if status == FriendRequestStatus::Accepted {
            sqlx::query(
                r#"
                INSERT INTO friend_links (user_id, friend_id)
                VALUES ($1, $2), ($2, $1)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(requester_id)
            .bind(requested_id)
            .execute(&mut *tx)
            .await?;
        }

        let updated = sqlx::query_as::<_, FriendRequestEntity>(&format!(
            r#"
            UPDATE friend_requests
            SET status = $3, updated_at = NOW()
            WHERE requester_id = $1 AND requested_id = $2
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(requester_id)
        .bind(requested_id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ResolvedFriendRequest { request: updated, requester })
    }
}
