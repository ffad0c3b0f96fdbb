//! Success message constants used throughout the application.

// Authentication messages
pub const MSG_USER_REGISTERED: &str = "User registered successfully";
pub const MSG_LOGIN_SUCCESS: &str = "Login successful";

// User management messages
pub const MSG_USERS_FOUND: &str = "Users found";
pub const MSG_USER_FOUND: &str = "User found";
pub const MSG_USER_PROFILE_RETRIEVED: &str = "User profile retrieved";
pub const MSG_USER_UPDATED: &str = "User profile updated successfully";
pub const MSG_USER_DELETED: &str = "User account deleted successfully";
pub const MSG_USER_COUNT: &str = "User count";
pub const MSG_USER_COMMUNITIES: &str = "User communities";

// Role management messages
pub const MSG_ROLE_UPDATED: &str = "User role updated successfully";

// Community messages
pub const MSG_COMMUNITY_CREATED: &str = "Community created successfully";
pub const MSG_COMMUNITIES_FOUND: &str = "Communities found";
pub const MSG_COMMUNITY_FOUND: &str = "Community found";
pub const MSG_COMMUNITY_UPDATED: &str = "Community updated successfully";
pub const MSG_COMMUNITY_DELETED: &str = "Community deleted successfully";
pub const MSG_COMMUNITY_MEMBERS: &str = "Community members";
pub const MSG_COMMUNITY_JOINED: &str = "Joined community";
pub const MSG_COMMUNITY_LEFT: &str = "Left community";
