//! MongoDB collection names.

pub const COLLECTION_USERS: &str = "users";
pub const COLLECTION_COMMUNITIES: &str = "communities";
pub const COLLECTION_COMMUNITY_MEMBERS: &str = "community_members";
