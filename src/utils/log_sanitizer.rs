//! Log sanitization utilities for masking sensitive data.
//!
//! This module provides functions to mask sensitive information like emails
//! and user names before logging, preventing accidental exposure of PII.

const VISIBLE_CHARS: usize = 3;

fn visible_prefix(value: &str) -> String {
    value.chars().take(VISIBLE_CHARS).collect()
}

/// Mask an email address for safe logging.
///
/// Shows only the first 3 characters of the local part followed by
/// asterisks and the domain.
///
/// # Examples
/// ```ignore
/// assert_eq!(mask_email("user@example.com"), "use***@example.com");
/// assert_eq!(mask_email("ab@test.org"), "ab***@test.org");
/// ```
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local_part, domain)) => format!("{}***@{}", visible_prefix(local_part), domain),
        // Not a valid email format, just mask most of it
        None => mask_username(email),
    }
}

/// Mask a user name for safe logging.
pub fn mask_username(user_name: &str) -> String {
    format!("{}***", visible_prefix(user_name))
}
