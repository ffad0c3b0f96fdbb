//! Community-related response models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::user::to_utc;
use crate::models::{Community, CommunityMembership};

/// Community data returned in API responses
#[derive(Debug, Serialize, Clone, PartialEq, ToSchema)]
pub struct CommunityResponse {
    #[schema(example = "507f1f77bcf86cd799439011")]
    pub id: String,
    #[schema(example = "zoolea")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "this is zoolea community")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Community> for CommunityResponse {
    fn from(community: Community) -> Self {
        Self {
            id: community.id.to_hex(),
            name: community.name,
            description: community.description,
            created_at: to_utc(community.created_at),
            updated_at: to_utc(community.updated_at),
        }
    }
}

/// Membership linking a user to a community
#[derive(Debug, Serialize, Clone, PartialEq, ToSchema)]
pub struct MembershipResponse {
    pub id: String,
    pub user_id: String,
    pub community_id: String,
    pub joined_at: DateTime<Utc>,
}

impl From<CommunityMembership> for MembershipResponse {
    fn from(membership: CommunityMembership) -> Self {
        Self {
            id: membership.id.to_hex(),
            user_id: membership.user_id.to_hex(),
            community_id: membership.community_id.to_hex(),
            joined_at: to_utc(membership.joined_at),
        }
    }
}
