use crate::{
    database::{RelationUpdate, UserFilter, UserStore},
    models::User,
    utils::UserError,
};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

/// In-process `UserStore`. Keeps insertion order and enforces the same
/// unique email constraint as the MongoDB index. Each call holds the lock
/// for its whole duration, so updates are atomic per call.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn ensure_indexes(&self) -> Result<(), UserError> {
        Ok(())
    }

    async fn insert(&self, user: &User) -> Result<(), UserError> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email == user.email) {
            return Err(UserError::DuplicateKey {
                field: "email".to_string(),
                message: format!("dup key: {{ email: \"{}\" }}", user.email),
            });
        }
        if users.iter().any(|u| u.id == user.id) {
            return Err(UserError::DuplicateKey {
                field: "_id".to_string(),
                message: format!("dup key: {{ _id: {} }}", user.id.to_hex()),
            });
        }

        users.push(user.clone());
        log::debug!("User stored in memory: {}", user.email);
        Ok(())
    }

    async fn find(&self, filter: &UserFilter) -> Result<Vec<User>, UserError> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| filter.matches(u)).cloned().collect())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, UserError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| &u.id == id).cloned())
    }

    async fn update_relations(&self, id: &ObjectId, update: &RelationUpdate) -> Result<bool, UserError> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| &u.id == id) {
            Some(user) => {
                update.apply(user);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, UserError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| &u.id != id);
        Ok(users.len() < before)
    }

    async fn delete_all(&self) -> Result<u64, UserError> {
        let mut users = self.users.write().await;
        let removed = users.len() as u64;
        users.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<u64, UserError> {
        Ok(self.users.read().await.len() as u64)
    }
}
