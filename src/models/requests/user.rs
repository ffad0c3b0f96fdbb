//! User-related request models.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::ApiError;
use crate::models::{Role, UserChanges};
use crate::validators::{validate_username_format, validation_errors_to_api_error};

/// Request payload for updating a user
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    /// New email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "newemail@example.com")]
    pub email: Option<String>,
    /// New login handle (3-50 characters, letters, numbers, underscores, hyphens only)
    #[validate(
        length(
            min = 3,
            max = 50,
            message = "User name must be between 3 and 50 characters"
        ),
        custom(function = "validate_username_format")
    )]
    #[schema(example = "newusername")]
    pub user_name: Option<String>,
    /// New password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "newSecurePassword456")]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn into_changes(self) -> Result<UserChanges, ApiError> {
        self.validate().map_err(validation_errors_to_api_error)?;
        Ok(UserChanges {
            email: self.email.map(|e| e.to_lowercase()),
            user_name: self.user_name,
            password: self.password,
        })
    }
}

/// Request payload for updating user role (admin only)
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    /// New role: 'admin' or 'member'
    #[schema(example = "admin")]
    pub role: Role,
}
