use log::info;
use std::sync::Arc;

use crate::api::error;
use crate::modules::user::{model::UserResponse, repository::UserRepository};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn with_dependencies(repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<UserResponse, error::SystemError> {
        self.repo
            .find_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| error::SystemError::not_found("User not found"))
    }

    pub async fn create(&self, name: &str) -> Result<UserResponse, error::SystemError> {
        if name.trim().is_empty() {
            return Err(error::SystemError::bad_request("Name cannot be empty"));
        }
        let user = self.repo.create(name).await?;
        info!("User {} created", user.id);
        Ok(UserResponse::from(user))
    }

    pub async fn delete(&self, id: i64) -> Result<(), error::SystemError> {
        if !self.repo.delete(id).await? {
            return Err(error::SystemError::not_found("User not found"));
        }
        info!("User {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::memory_store::MemoryStore;

    fn service() -> UserService {
        UserService::with_dependencies(Arc::new(MemoryStore::new()))
    }

    #[actix_web::test]
    async fn create_then_get_user() {
        let service = service();
        let alice = service.create("alice").await.unwrap();
        let found = service.get_by_id(alice.id).await.unwrap();
        assert_eq!(found, alice);
        assert_eq!(found.name, "alice");
    }

    #[actix_web::test]
    async fn blank_name_is_rejected() {
        let err = service().create("   ").await.unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));
    }

    #[actix_web::test]
    async fn delete_missing_user_is_not_found() {
        let service = service();
        let bob = service.create("bob").await.unwrap();
        service.delete(bob.id).await.unwrap();

        assert!(matches!(service.delete(bob.id).await, Err(error::SystemError::NotFound(_))));
        assert!(matches!(service.get_by_id(bob.id).await, Err(error::SystemError::NotFound(_))));
    }
}
