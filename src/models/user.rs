use crate::utils::{parse_object_ids, UserError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use mongodb::bson::{oid::ObjectId, spec::BinarySubtype, Binary};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const USERS_COLLECTION: &str = "users";
pub const DEFAULT_AVATAR_PATH: &str = "public/images/default-avatar.png";
pub const DEFAULT_AVATAR_CONTENT_TYPE: &str = "image/png";

/// Avatar do usuário (bytes + MIME type)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub data: Binary,
    #[serde(rename = "contentType")]
    pub content_type: String,
}

impl Image {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Image {
            data: Binary {
                subtype: BinarySubtype::Generic,
                bytes,
            },
            content_type: content_type.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data.bytes
    }

    /// `data:image/png;base64,...` para exibir direto num <img>
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(self.bytes()))
    }
}

/// Factory for the placeholder avatar. The file is read every time a default
/// is resolved, so replacing it on disk takes effect for new users.
#[derive(Debug, Clone)]
pub struct DefaultAvatar {
    path: PathBuf,
    content_type: String,
}

impl DefaultAvatar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DefaultAvatar {
            path: path.into(),
            content_type: DEFAULT_AVATAR_CONTENT_TYPE.to_string(),
        }
    }

    pub fn load(&self) -> Result<Image, UserError> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            UserError::Asset(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        Ok(Image::new(bytes, self.content_type.clone()))
    }
}

impl Default for DefaultAvatar {
    fn default() -> Self {
        DefaultAvatar::new(DEFAULT_AVATAR_PATH)
    }
}

/// Usuário (armazenado no MongoDB, coleção `users`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub name: String,

    /// Único na coleção (índice unique)
    pub email: String,

    /// Stored as supplied.
    pub password: String,

    pub image: Image,

    /// Amizades confirmadas
    #[serde(default)]
    pub friends: Vec<ObjectId>,

    /// Pedidos de amizade recebidos
    #[serde(rename = "friendRequests", default)]
    pub friend_requests: Vec<ObjectId>,
}

impl User {
    pub fn relation(&self, relation: Relation) -> &[ObjectId] {
        match relation {
            Relation::Friends => &self.friends,
            Relation::FriendRequests => &self.friend_requests,
        }
    }

    pub(crate) fn relation_mut(&mut self, relation: Relation) -> &mut Vec<ObjectId> {
        match relation {
            Relation::Friends => &mut self.friends,
            Relation::FriendRequests => &mut self.friend_requests,
        }
    }
}

/// The two reference lists a User carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Friends,
    FriendRequests,
}

impl Relation {
    pub const ALL: [Relation; 2] = [Relation::Friends, Relation::FriendRequests];

    /// Nome do campo no documento
    pub fn field(self) -> &'static str {
        match self {
            Relation::Friends => "friends",
            Relation::FriendRequests => "friendRequests",
        }
    }
}

/// Input for creating a User. Required fields are optional here so that a
/// missing value surfaces as a validation error from `build`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image: Option<Image>,
    #[serde(default)]
    pub friends: Vec<ObjectId>,
    #[serde(rename = "friendRequests", default)]
    pub friend_requests: Vec<ObjectId>,
}

impl UserDraft {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        UserDraft {
            name: Some(name.into()),
            email: Some(email.into()),
            password: Some(password.into()),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: Image) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_friends(mut self, friends: Vec<ObjectId>) -> Self {
        self.friends = friends;
        self
    }

    pub fn with_friend_requests(mut self, requests: Vec<ObjectId>) -> Self {
        self.friend_requests = requests;
        self
    }

    /// Same as `with_friends`, from 24-char hex strings.
    pub fn with_friend_hexes<S: AsRef<str>>(self, hexes: &[S]) -> Result<Self, UserError> {
        Ok(self.with_friends(parse_object_ids(hexes)?))
    }

    pub fn with_friend_request_hexes<S: AsRef<str>>(self, hexes: &[S]) -> Result<Self, UserError> {
        Ok(self.with_friend_requests(parse_object_ids(hexes)?))
    }

    /// Valida os campos obrigatórios e monta o User com um novo `_id`.
    /// O avatar padrão só é lido do disco quando `image` está ausente.
    pub fn build(self, avatar: &DefaultAvatar) -> Result<User, UserError> {
        let mut missing = Vec::new();
        let name = required(self.name, "name", &mut missing);
        let email = required(self.email, "email", &mut missing);
        let password = required(self.password, "password", &mut missing);

        let (Some(name), Some(email), Some(password)) = (name, email, password) else {
            return Err(UserError::Validation(missing));
        };

        let image = match self.image {
            Some(image) => image,
            None => avatar.load()?,
        };

        Ok(User {
            id: ObjectId::new(),
            name,
            email,
            password,
            image,
            friends: self.friends,
            friend_requests: self.friend_requests,
        })
    }
}

fn required(
    value: Option<String>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            missing.push(field);
            None
        }
    }
}

/// A User with one or both reference lists resolved into full records.
/// `None` means the relation was not requested.
#[derive(Debug, Clone)]
pub struct PopulatedUser {
    pub user: User,
    pub friends: Option<Vec<User>>,
    pub friend_requests: Option<Vec<User>>,
}

/// Visão pública do usuário (sem senha)
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub friends: Vec<String>,
    #[serde(rename = "friendRequests")]
    pub friend_requests: Vec<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id.to_hex(),
            name: user.name,
            email: user.email,
            avatar: user.image.to_data_uri(),
            friends: user.friends.iter().map(|id| id.to_hex()).collect(),
            friend_requests: user.friend_requests.iter().map(|id| id.to_hex()).collect(),
        }
    }
}
