use mongodb::bson::oid::ObjectId;

use crate::errors::ApiError;

/// Parse a hex ObjectId, failing with `BadRequest(message)` when malformed.
pub fn parse_object_id(id: &str, message: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::BadRequest(message.to_string()))
}
