//! Community and membership documents.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Community document stored in the record store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Community {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Normalized input for creating a community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommunity {
    pub name: String,
    pub description: Option<String>,
}

/// Store-level community update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommunityChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CommunityChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Association between a user and a community.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CommunityMembership {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub community_id: ObjectId,
    pub joined_at: DateTime,
}
