use crate::{
    models::{Relation, User},
    utils::UserError,
};
use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId, Document};

/// Storage primitives for the `users` collection. Every method is a single
/// request to the store; atomicity is per document.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates the unique index on `email`
    async fn ensure_indexes(&self) -> Result<(), UserError>;

    async fn insert(&self, user: &User) -> Result<(), UserError>;

    /// Store order
    async fn find(&self, filter: &UserFilter) -> Result<Vec<User>, UserError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, UserError>;

    /// Applies `update` in one atomic write. Returns false if no document
    /// matched `id`.
    async fn update_relations(&self, id: &ObjectId, update: &RelationUpdate) -> Result<bool, UserError>;

    async fn delete(&self, id: &ObjectId) -> Result<bool, UserError>;

    async fn delete_all(&self) -> Result<u64, UserError>;

    async fn count(&self) -> Result<u64, UserError>;
}

/// Filtro de busca. Campos `None` não restringem.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub email: Option<String>,
    pub name: Option<String>,
    pub ids: Option<Vec<ObjectId>>,
}

impl UserFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        UserFilter {
            email: Some(email.into()),
            ..Default::default()
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        UserFilter {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn by_ids(ids: Vec<ObjectId>) -> Self {
        UserFilter {
            ids: Some(ids),
            ..Default::default()
        }
    }

    pub fn to_document(&self) -> Document {
        let mut filter = doc! {};
        if let Some(email) = &self.email {
            filter.insert("email", email.as_str());
        }
        if let Some(name) = &self.name {
            filter.insert("name", name.as_str());
        }
        if let Some(ids) = &self.ids {
            filter.insert("_id", doc! { "$in": ids.clone() });
        }
        filter
    }

    pub fn matches(&self, user: &User) -> bool {
        self.email.as_ref().map_or(true, |e| &user.email == e)
            && self.name.as_ref().map_or(true, |n| &user.name == n)
            && self.ids.as_ref().map_or(true, |ids| ids.contains(&user.id))
    }
}

/// One `$addToSet` and/or one `$pull` on the relationship lists, applied
/// together as a single update.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationUpdate {
    pub add: Option<(Relation, ObjectId)>,
    pub remove: Option<(Relation, ObjectId)>,
}

impl RelationUpdate {
    /// requester: friendRequests -> friends
    pub fn accept(requester: ObjectId) -> Self {
        RelationUpdate {
            add: Some((Relation::Friends, requester)),
            remove: Some((Relation::FriendRequests, requester)),
        }
    }

    pub fn request(requester: ObjectId) -> Self {
        RelationUpdate {
            add: Some((Relation::FriendRequests, requester)),
            remove: None,
        }
    }

    pub fn decline(requester: ObjectId) -> Self {
        RelationUpdate {
            add: None,
            remove: Some((Relation::FriendRequests, requester)),
        }
    }

    pub fn unfriend(friend: ObjectId) -> Self {
        RelationUpdate {
            add: None,
            remove: Some((Relation::Friends, friend)),
        }
    }

    pub fn to_document(&self) -> Document {
        let mut update = doc! {};
        if let Some((relation, id)) = &self.add {
            update.insert("$addToSet", field_doc(*relation, *id));
        }
        if let Some((relation, id)) = &self.remove {
            update.insert("$pull", field_doc(*relation, *id));
        }
        update
    }

    /// Same semantics as the server: add only if absent, pull every
    /// occurrence.
    pub fn apply(&self, user: &mut User) {
        if let Some((relation, id)) = &self.add {
            let list = user.relation_mut(*relation);
            if !list.contains(id) {
                list.push(*id);
            }
        }
        if let Some((relation, id)) = &self.remove {
            user.relation_mut(*relation).retain(|existing| existing != id);
        }
    }
}

fn field_doc(relation: Relation, id: ObjectId) -> Document {
    let mut inner = Document::new();
    inner.insert(relation.field(), id);
    inner
}
