use mongodb::error::{ErrorKind, WriteFailure};
use std::fmt;

/// MongoDB server code for a unique index violation
pub const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug)]
pub enum UserError {
    /// Required fields absent (or empty) at creation time
    Validation(Vec<&'static str>),
    /// Unique index violated; `field` is the indexed key (`email`, `_id`)
    DuplicateKey { field: String, message: String },
    /// Store could not be reached
    Connectivity(String),
    DatabaseError(String),
    NotFound(String),
    InvalidId(String),
    /// Default avatar could not be read
    Asset(String),
}

impl UserError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, UserError::DuplicateKey { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, UserError::Validation(_))
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, UserError::Connectivity(_))
    }
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserError::Validation(fields) => {
                write!(f, "Validation failed: {} required", fields.join(", "))
            }
            UserError::DuplicateKey { field, message } => {
                write!(f, "Duplicate key on '{}' (E{}): {}", field, DUPLICATE_KEY_CODE, message)
            }
            UserError::Connectivity(msg) => write!(f, "Store unavailable: {}", msg),
            UserError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            UserError::NotFound(msg) => write!(f, "Not found: {}", msg),
            UserError::InvalidId(msg) => write!(f, "Invalid id: {}", msg),
            UserError::Asset(msg) => write!(f, "Asset error: {}", msg),
        }
    }
}

impl std::error::Error for UserError {}

/// Extrai o campo do nome do índice na mensagem do servidor
/// (`... index: email_1 dup key: ...` -> `email`, `_id_` -> `_id`)
pub fn duplicate_key_field(message: &str) -> String {
    let Some(index) = message
        .split("index: ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
    else {
        return "unknown".to_string();
    };

    if index == "_id_" {
        return "_id".to_string();
    }
    index
        .strip_suffix("_1")
        .or_else(|| index.strip_suffix("_-1"))
        .unwrap_or(index)
        .to_string()
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        let message = err.to_string();
        match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE => {
                UserError::DuplicateKey { field: duplicate_key_field(&e.message), message }
            }
            ErrorKind::Command(e) if e.code == DUPLICATE_KEY_CODE => {
                UserError::DuplicateKey { field: duplicate_key_field(&e.message), message }
            }
            ErrorKind::Io(_)
            | ErrorKind::ServerSelection { .. }
            | ErrorKind::ConnectionPoolCleared { .. } => UserError::Connectivity(message),
            _ => UserError::DatabaseError(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MongoDB;

    #[test]
    fn test_validation_lists_fields() {
        let err = UserError::Validation(vec!["name", "password"]);
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Validation failed: name, password required");
    }

    #[test]
    fn test_duplicate_key_field_from_index_name() {
        let email = "E11000 duplicate key error collection: social_users.users index: email_1 dup key: { email: \"someone@example.com\" }";
        let id = "E11000 duplicate key error collection: social_users.users index: _id_ dup key: { _id: ObjectId('123456789012345678901234') }";

        assert_eq!(duplicate_key_field(email), "email");
        assert_eq!(duplicate_key_field(id), "_id");
        assert_eq!(duplicate_key_field("E11000 duplicate key error"), "unknown");
    }

    #[test]
    fn test_duplicate_key_mentions_code() {
        let err = UserError::DuplicateKey {
            field: "email".to_string(),
            message: "users index: email_1".to_string(),
        };
        assert!(err.is_duplicate_key());
        assert!(err.to_string().contains("E11000"));
    }

    #[test]
    fn test_io_error_is_connectivity() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = UserError::from(mongodb::error::Error::from(io));
        assert!(err.is_connectivity(), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_unreachable_store_is_connectivity() {
        // Nada escuta na porta 1; falha após o server_selection_timeout (5s)
        let result = MongoDB::new("mongodb://127.0.0.1:1", "social_users_unreachable").await;
        match result {
            Err(err) => assert!(err.is_connectivity(), "got {:?}", err),
            Ok(_) => panic!("expected connectivity error"),
        }
    }
}
