//! User-related custom validators.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::constants::ERR_INVALID_USERNAME_FORMAT;

lazy_static! {
    static ref USER_NAME_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Custom validator for user names.
/// Allows letters, numbers, underscores and hyphens only.
pub fn validate_username_format(user_name: &str) -> Result<(), ValidationError> {
    if USER_NAME_PATTERN.is_match(user_name) {
        return Ok(());
    }
    let mut error = ValidationError::new("invalid_user_name");
    error.message = Some(ERR_INVALID_USERNAME_FORMAT.into());
    Err(error)
}
