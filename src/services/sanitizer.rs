//! Strips credentials from user records before they leave the service layer.
//!
//! Sanitizing builds a new [`UserResponse`], which has no password field at
//! all; the stored record is never touched.

use crate::models::{User, UserResponse};

/// Project a possibly-absent user. Absent stays absent.
pub fn sanitize(user: Option<User>) -> Option<UserResponse> {
    user.map(UserResponse::from)
}

pub fn sanitize_all(users: Vec<User>) -> Vec<UserResponse> {
    users.into_iter().map(UserResponse::from).collect()
}
