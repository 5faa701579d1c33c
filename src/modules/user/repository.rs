use crate::{api::error, modules::user::schema::UserEntity};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError>;
    async fn create(&self, name: &str) -> Result<UserEntity, error::SystemError>;
    /// Returns `false` when no user had this id.
    async fn delete(&self, id: i64) -> Result<bool, error::SystemError>;
}
