use crate::models::{DefaultAvatar, DEFAULT_AVATAR_PATH};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub default_avatar_path: String,
}

impl Config {
    /// Lê a configuração do ambiente (chame `dotenv().ok()` antes)
    pub fn from_env() -> Self {
        Config {
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "social_users".to_string()),
            default_avatar_path: env::var("DEFAULT_AVATAR_PATH")
                .unwrap_or_else(|_| DEFAULT_AVATAR_PATH.to_string()),
        }
    }

    pub fn default_avatar(&self) -> DefaultAvatar {
        DefaultAvatar::new(&self.default_avatar_path)
    }
}
