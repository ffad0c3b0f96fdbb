//! Authentication request models.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::ApiError;
use crate::models::{NewUser, Role};
use crate::validators::{validate_username_format, validation_errors_to_api_error};

/// Request payload for user registration
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// User's email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Unique login handle (3-50 characters, letters, numbers, underscores, hyphens only)
    #[validate(
        length(
            min = 3,
            max = 50,
            message = "User name must be between 3 and 50 characters"
        ),
        custom(function = "validate_username_format")
    )]
    #[schema(example = "johndoe")]
    pub user_name: String,
    /// Password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "securePassword123")]
    pub password: String,
}

impl RegisterRequest {
    /// Validate and normalize into a new member account. Email is lower-cased.
    pub fn into_new_user(self) -> Result<NewUser, ApiError> {
        self.validate().map_err(validation_errors_to_api_error)?;
        Ok(NewUser {
            email: self.email.to_lowercase(),
            user_name: self.user_name,
            password: self.password,
            role: Role::Member,
        })
    }
}

/// Request payload for user login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Email address or user name
    #[validate(length(min = 1, message = "Login is required"))]
    #[schema(example = "johndoe")]
    pub login: String,
    /// User's password
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "securePassword123")]
    pub password: String,
}
