use crate::{
    database::{MongoDB, RelationUpdate, UserFilter, UserStore},
    models::{User, USERS_COLLECTION},
    utils::UserError,
};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::IndexOptions,
    Collection, IndexModel,
};

/// `UserStore` sobre a coleção `users` do MongoDB
#[derive(Clone)]
pub struct MongoUserStore {
    collection: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            collection: db.collection::<User>(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn ensure_indexes(&self) -> Result<(), UserError> {
        log::info!("🔧 Creating users indexes...");

        // users(email) UNIQUE - a unicidade do email depende deste índice
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match self.collection.create_index(email_index).await {
            Ok(result) => log::info!("   ✅ Index ready: users(email) unique [{}]", result.index_name),
            Err(e) => {
                log::error!("   ❌ Failed to create users(email) unique index: {}", e);
                return Err(e.into());
            }
        }

        Ok(())
    }

    async fn insert(&self, user: &User) -> Result<(), UserError> {
        self.collection.insert_one(user).await.map_err(|e| {
            let err = UserError::from(e);
            if let UserError::DuplicateKey { field, .. } = &err {
                log::warn!("⚠️  Duplicate {} rejected: {}", field, user.email);
            }
            err
        })?;

        log::info!("✅ User saved: {} ({})", user.email, user.id.to_hex());
        Ok(())
    }

    async fn find(&self, filter: &UserFilter) -> Result<Vec<User>, UserError> {
        let cursor = self.collection.find(filter.to_document()).await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, UserError> {
        Ok(self.collection.find_one(doc! { "_id": *id }).await?)
    }

    async fn update_relations(&self, id: &ObjectId, update: &RelationUpdate) -> Result<bool, UserError> {
        let result = self
            .collection
            .update_one(doc! { "_id": *id }, update.to_document())
            .await?;

        log::debug!(
            "🔄 Relations updated for {}: matched={} modified={}",
            id.to_hex(),
            result.matched_count,
            result.modified_count
        );
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, UserError> {
        let result = self.collection.delete_one(doc! { "_id": *id }).await?;
        if result.deleted_count > 0 {
            log::info!("🗑️  User deleted: {}", id.to_hex());
        }
        Ok(result.deleted_count > 0)
    }

    async fn delete_all(&self) -> Result<u64, UserError> {
        let result = self.collection.delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    async fn count(&self) -> Result<u64, UserError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }
}

/// Estes testes precisam de um MongoDB rodando (MONGODB_URI)
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{DefaultAvatar, Relation, UserDraft};
    use crate::services::user_service;

    /// Cada teste usa seu próprio banco, então podem rodar em paralelo
    async fn store(db_name: &str) -> MongoUserStore {
        dotenv::dotenv().ok();
        let _ = env_logger::builder().is_test(true).try_init();

        let config = Config::from_env();
        let db = MongoDB::new(&config.mongodb_uri, &format!("social_users_test_{}", db_name))
            .await
            .expect("MongoDB must be running for this test");
        let store = MongoUserStore::new(&db);
        store.ensure_indexes().await.unwrap();
        store.delete_all().await.unwrap();
        store
    }

    fn draft(name: &str, email: &str) -> UserDraft {
        UserDraft::new(name, email, "password")
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_can_list_all_users() {
        let store = store("list").await;
        let users = user_service::list_users(&store).await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_saved_user_has_default_avatar() {
        let store = store("avatar").await;
        let user = draft("someone", "someone@example.com")
            .build(&DefaultAvatar::default())
            .unwrap();
        user_service::save_user(&store, &user).await.unwrap();

        let users = user_service::list_users(&store).await.unwrap();
        assert_eq!(users[0].name, "someone");
        assert_eq!(users[0].email, "someone@example.com");
        assert_eq!(users[0].password, "password");
        assert_eq!(
            users[0].image.bytes(),
            std::fs::read("public/images/default-avatar.png").unwrap().as_slice()
        );
        assert_eq!(users[0].image.content_type, "image/png");
        store.delete_all().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_email_address_is_unique() {
        let store = store("unique").await;
        let avatar = DefaultAvatar::default();
        let one = draft("someone one", "someone@example.com").build(&avatar).unwrap();
        let two = draft("someone two", "someone@example.com").build(&avatar).unwrap();

        user_service::save_user(&store, &one).await.unwrap();
        let err = user_service::save_user(&store, &two).await.unwrap_err();

        match &err {
            UserError::DuplicateKey { field, .. } => assert_eq!(field, "email"),
            other => panic!("expected duplicate key, got {:?}", other),
        }
        let users = user_service::list_users(&store).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "someone one");
        store.delete_all().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_saving_same_user_twice_reports_id() {
        let store = store("same_id").await;
        let user = draft("someone", "someone@example.com")
            .build(&DefaultAvatar::default())
            .unwrap();
        let mut renamed = user.clone();
        renamed.email = "other@example.com".to_string();

        user_service::save_user(&store, &user).await.unwrap();
        match user_service::save_user(&store, &renamed).await.unwrap_err() {
            UserError::DuplicateKey { field, .. } => assert_eq!(field, "_id"),
            other => panic!("expected duplicate key, got {:?}", other),
        }
        store.delete_all().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_user_can_accept_a_friend_request() {
        let store = store("accept").await;
        let user = draft("someone one", "someone1@example.com")
            .with_friend_request_hexes(&["123456789012345678901234", "223456789012345678901234"])
            .unwrap()
            .build(&DefaultAvatar::default())
            .unwrap();
        user_service::save_user(&store, &user).await.unwrap();

        let requester = ObjectId::parse_str("123456789012345678901234").unwrap();
        user_service::accept_friend_request(&store, &user.id, &requester).await.unwrap();

        let stored = user_service::find_user(&store, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.friends, vec![requester]);
        assert_eq!(
            stored.friend_requests,
            vec![ObjectId::parse_str("223456789012345678901234").unwrap()]
        );
        store.delete_all().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_can_populate_friends_with_users() {
        let store = store("populate").await;
        let avatar = DefaultAvatar::default();
        let rita = draft("Rita", "rita@gmail.com").build(&avatar).unwrap();
        user_service::save_user(&store, &rita).await.unwrap();
        let marina = draft("Marina", "marina@gmail.com")
            .with_friends(vec![rita.id])
            .build(&avatar)
            .unwrap();
        user_service::save_user(&store, &marina).await.unwrap();

        let populated = user_service::populate_user(&store, &marina.id, &[Relation::Friends])
            .await
            .unwrap()
            .unwrap();

        let friends = populated.friends.unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].id, rita.id);
        assert_eq!(friends[0].name, "Rita");
        assert_eq!(friends[0].email, "rita@gmail.com");
        assert!(populated.friend_requests.is_none());
        store.delete_all().await.unwrap();
    }
}
