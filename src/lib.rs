//! User records for a social network: identity, avatar, friends and
//! inbound friend requests, persisted in MongoDB.

pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod utils;

pub use database::{MemoryUserStore, MongoDB, MongoUserStore, RelationUpdate, UserFilter, UserStore};
pub use models::{DefaultAvatar, Image, PopulatedUser, Relation, User, UserDraft, UserProfile};
pub use utils::UserError;
