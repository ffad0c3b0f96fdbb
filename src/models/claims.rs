use serde::{Deserialize, Serialize};

use crate::models::Role;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub role: Role,
    pub exp: usize, // expiration timestamp
    pub iat: usize, // issued at timestamp
}
