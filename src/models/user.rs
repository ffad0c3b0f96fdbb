use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// User roles for role-based access control
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Member => write!(f, "member"),
        }
    }
}

impl Role {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// User document stored in the record store.
///
/// Carries the password hash; never serialize this type into an API response.
/// Use [`crate::models::UserResponse`] for anything crossing the service boundary.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub user_name: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Normalized input for creating a user.
///
/// `password` is plain text here; the user service hashes it before persisting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub user_name: String,
    pub password: String,
    pub role: Role,
}

/// Field changes a user may make to their own record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub email: Option<String>,
    pub user_name: Option<String>,
    pub password: Option<String>,
}

/// Store-level update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub user_name: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

impl UserUpdate {
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.user_name.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
    }
}

/// Predicate for single-user lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    /// Exact email match.
    Email(String),
    /// Email OR user name equal to the given field.
    LoginDetails(String),
    /// Any user holding the role.
    Role(Role),
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        match self {
            UserFilter::Email(email) => user.email == *email,
            UserFilter::LoginDetails(field) => user.email == *field || user.user_name == *field,
            UserFilter::Role(role) => user.role == *role,
        }
    }
}
