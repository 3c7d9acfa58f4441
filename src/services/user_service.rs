// ==================== USERS & FRIENDSHIPS ====================
// Operações sobre a coleção `users`. O store é sempre passado
// explicitamente (MongoUserStore em produção, MemoryUserStore nos testes).

use crate::{
    database::{RelationUpdate, UserFilter, UserStore},
    models::{DefaultAvatar, PopulatedUser, Relation, User, UserDraft},
    utils::UserError,
};
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;

/// Valida o draft, aplica o avatar padrão e salva
pub async fn create_user<S: UserStore + ?Sized>(
    store: &S,
    draft: UserDraft,
    avatar: &DefaultAvatar,
) -> Result<User, UserError> {
    let user = draft.build(avatar)?;
    save_user(store, &user).await?;
    Ok(user)
}

/// Persiste um usuário novo. Email repetido -> `UserError::DuplicateKey`
pub async fn save_user<S: UserStore + ?Sized>(store: &S, user: &User) -> Result<(), UserError> {
    store.insert(user).await
}

pub async fn list_users<S: UserStore + ?Sized>(store: &S) -> Result<Vec<User>, UserError> {
    store.find(&UserFilter::all()).await
}

pub async fn find_users<S: UserStore + ?Sized>(
    store: &S,
    filter: &UserFilter,
) -> Result<Vec<User>, UserError> {
    store.find(filter).await
}

pub async fn find_user<S: UserStore + ?Sized>(
    store: &S,
    id: &ObjectId,
) -> Result<Option<User>, UserError> {
    store.find_by_id(id).await
}

pub async fn find_user_by_email<S: UserStore + ?Sized>(
    store: &S,
    email: &str,
) -> Result<Option<User>, UserError> {
    Ok(store.find(&UserFilter::by_email(email)).await?.into_iter().next())
}

/// Move `requester` de friendRequests para friends numa única escrita
pub async fn accept_friend_request<S: UserStore + ?Sized>(
    store: &S,
    user_id: &ObjectId,
    requester: &ObjectId,
) -> Result<(), UserError> {
    apply(store, user_id, RelationUpdate::accept(*requester)).await?;
    log::info!("🤝 {} accepted friend request from {}", user_id.to_hex(), requester.to_hex());
    Ok(())
}

/// Adds `requester` to the target's inbound requests (no duplicates).
pub async fn send_friend_request<S: UserStore + ?Sized>(
    store: &S,
    target: &ObjectId,
    requester: &ObjectId,
) -> Result<(), UserError> {
    apply(store, target, RelationUpdate::request(*requester)).await
}

pub async fn decline_friend_request<S: UserStore + ?Sized>(
    store: &S,
    user_id: &ObjectId,
    requester: &ObjectId,
) -> Result<(), UserError> {
    apply(store, user_id, RelationUpdate::decline(*requester)).await
}

pub async fn remove_friend<S: UserStore + ?Sized>(
    store: &S,
    user_id: &ObjectId,
    friend: &ObjectId,
) -> Result<(), UserError> {
    apply(store, user_id, RelationUpdate::unfriend(*friend)).await
}

pub async fn delete_user<S: UserStore + ?Sized>(store: &S, id: &ObjectId) -> Result<(), UserError> {
    if !store.delete(id).await? {
        return Err(UserError::NotFound(format!("User {}", id.to_hex())));
    }
    Ok(())
}

async fn apply<S: UserStore + ?Sized>(
    store: &S,
    user_id: &ObjectId,
    update: RelationUpdate,
) -> Result<(), UserError> {
    if !store.update_relations(user_id, &update).await? {
        return Err(UserError::NotFound(format!("User {}", user_id.to_hex())));
    }
    Ok(())
}

/// Resolve as listas de referência pedidas em usuários completos.
///
/// A ordem de cada lista é preservada; referências para usuários que não
/// existem são omitidas. Retorna `None` se o próprio usuário não existe.
pub async fn populate_user<S: UserStore + ?Sized>(
    store: &S,
    id: &ObjectId,
    relations: &[Relation],
) -> Result<Option<PopulatedUser>, UserError> {
    let Some(user) = store.find_by_id(id).await? else {
        return Ok(None);
    };

    let mut wanted: Vec<ObjectId> = Vec::new();
    for relation in Relation::ALL {
        if relations.contains(&relation) {
            for ref_id in user.relation(relation) {
                if !wanted.contains(ref_id) {
                    wanted.push(*ref_id);
                }
            }
        }
    }

    let resolved: HashMap<ObjectId, User> = if wanted.is_empty() {
        HashMap::new()
    } else {
        store
            .find(&UserFilter::by_ids(wanted))
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect()
    };

    let resolve = |relation: Relation| -> Option<Vec<User>> {
        if !relations.contains(&relation) {
            return None;
        }
        let users: Vec<User> = user
            .relation(relation)
            .iter()
            .filter_map(|ref_id| resolved.get(ref_id).cloned())
            .collect();
        let missing = user.relation(relation).len() - users.len();
        if missing > 0 {
            log::debug!(
                "{} unresolved {} reference(s) on {}",
                missing,
                relation.field(),
                user.id.to_hex()
            );
        }
        Some(users)
    };

    let friends = resolve(Relation::Friends);
    let friend_requests = resolve(Relation::FriendRequests);

    Ok(Some(PopulatedUser {
        user,
        friends,
        friend_requests,
    }))
}
