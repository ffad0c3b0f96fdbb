//! Error message constants used throughout the application.

// Authentication errors
pub const ERR_AUTH_REQUIRED: &str = "Authentication required";
pub const ERR_INVALID_AUTH_HEADER: &str = "Missing or invalid authorization header";
pub const ERR_INVALID_TOKEN: &str = "Invalid or expired token";
pub const ERR_INVALID_CREDENTIALS: &str = "Invalid login or password";

// User errors
pub const ERR_USER_NOT_FOUND: &str = "User not found";
pub const ERR_INVALID_USER_ID: &str = "Invalid user ID format";
pub const ERR_DUPLICATE_USER: &str = "Email or user name already registered";

// Community errors
pub const ERR_COMMUNITY_NOT_FOUND: &str = "Community not found";
pub const ERR_INVALID_COMMUNITY_ID: &str = "Invalid community ID format";
pub const ERR_DUPLICATE_COMMUNITY: &str = "Community name already taken";
pub const ERR_ALREADY_MEMBER: &str = "User is already a member of this community";
pub const ERR_NOT_A_MEMBER: &str = "User is not a member of this community";

// Authorization errors
pub const ERR_ONLY_ADMINS_ROLES: &str = "Only administrators can update user roles";
pub const ERR_ONLY_ADMINS_COMMUNITIES: &str = "Only administrators can manage communities";
pub const ERR_NO_PERMISSION_UPDATE_PROFILE: &str =
    "You don't have permission to update this user's profile";
pub const ERR_NO_PERMISSION_DELETE_ACCOUNT: &str =
    "You don't have permission to delete this user's account";

// Validation errors
pub const ERR_INVALID_USERNAME_FORMAT: &str =
    "User name can only contain letters, numbers, underscores, and hyphens";
pub const ERR_COMMUNITY_NAME_REQUIRED: &str = "Community name must not be empty";

// Infrastructure errors
pub const ERR_DATABASE: &str = "Database operation failed";
