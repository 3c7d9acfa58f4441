use crate::utils::error::UserError;
use mongodb::bson::oid::ObjectId;

/// Converte uma string hex de 24 caracteres em ObjectId
pub fn parse_object_id(hex: &str) -> Result<ObjectId, UserError> {
    ObjectId::parse_str(hex.trim())
        .map_err(|e| UserError::InvalidId(format!("'{}': {}", hex, e)))
}

pub fn parse_object_ids<S: AsRef<str>>(hexes: &[S]) -> Result<Vec<ObjectId>, UserError> {
    hexes.iter().map(|h| parse_object_id(h.as_ref())).collect()
}
