use crate::{
    api::error,
    modules::user::{repository::UserRepository, schema::UserEntity},
};

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            "SELECT id, name, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, name: &str) -> Result<UserEntity, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            "INSERT INTO users (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;

    #[sqlx::test(migrations = "./migrations")]
    #[cfg_attr(not(feature = "postgres-tests"), ignore = "needs DATABASE_URL for PostgreSQL")]
    async fn create_find_delete(pool: PgPool) {
        let repo = UserRepositoryPg::new(pool);
        let alice = repo.create("alice").await.unwrap();

        let found = repo.find_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(found.name, "alice");

        assert!(repo.delete(alice.id).await.unwrap());
        assert!(!repo.delete(alice.id).await.unwrap());
        assert!(repo.find_by_id(alice.id).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[cfg_attr(not(feature = "postgres-tests"), ignore = "needs DATABASE_URL for PostgreSQL")]
    async fn empty_name_violates_the_check(pool: PgPool) {
        let repo = UserRepositoryPg::new(pool);
        let err = repo.create("").await.unwrap_err();
        assert!(matches!(err, error::SystemError::DatabaseError(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[cfg_attr(not(feature = "postgres-tests"), ignore = "needs DATABASE_URL for PostgreSQL")]
    async fn deleting_a_user_cascades(pool: PgPool) {
        let repo = UserRepositoryPg::new(pool.clone());
        let alice = repo.create("alice").await.unwrap().id;
        let bob = repo.create("bob").await.unwrap().id;

        sqlx::query("INSERT INTO friend_requests (requester_id, requested_id) VALUES ($1, $2)")
            .bind(alice)
            .bind(bob)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO friend_links (user_id, friend_id) VALUES ($1, $2), ($2, $1)")
            .bind(alice)
            .bind(bob)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO blocks (blocker_id, blocked_id) VALUES ($1, $2)")
            .bind(bob)
            .bind(alice)
            .execute(&pool)
            .await
            .unwrap();

        assert!(repo.delete(bob).await.unwrap());

        for table in ["friend_requests", "friend_links", "blocks"] {
            let rows: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(rows, 0, "{table}");
        }
    }
}
