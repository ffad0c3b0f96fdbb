//! Role-based access checks.
//!
//! Each [`Action`] owns the predicate deciding which roles may perform it.
//! New actions add a variant and a match arm without touching existing ones.

use log::warn;

use crate::constants::{ERR_ONLY_ADMINS_COMMUNITIES, ERR_ONLY_ADMINS_ROLES};
use crate::errors::ApiError;
use crate::models::{Claims, Role, User, UserResponse};

/// Anything that can perform a request.
pub trait Actor {
    fn role(&self) -> Role;

    /// Identifier used in audit logs.
    fn actor_id(&self) -> String;
}

impl Actor for User {
    fn role(&self) -> Role {
        self.role
    }

    fn actor_id(&self) -> String {
        self.id.to_hex()
    }
}

impl Actor for UserResponse {
    fn role(&self) -> Role {
        self.role
    }

    fn actor_id(&self) -> String {
        self.id.clone()
    }
}

impl Actor for Claims {
    fn role(&self) -> Role {
        self.role
    }

    fn actor_id(&self) -> String {
        self.sub.clone()
    }
}

/// Guarded operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ChangeRole,
    ManageCommunity,
}

impl Action {
    fn permits(self, role: Role) -> bool {
        match self {
            Action::ChangeRole => role.is_admin(),
            Action::ManageCommunity => role.is_admin(),
        }
    }

    fn denial_message(self) -> &'static str {
        match self {
            Action::ChangeRole => ERR_ONLY_ADMINS_ROLES,
            Action::ManageCommunity => ERR_ONLY_ADMINS_COMMUNITIES,
        }
    }
}

/// Permit or deny `action` for `actor`.
pub fn authorize<A: Actor + ?Sized>(actor: &A, action: Action) -> Result<(), ApiError> {
    if action.permits(actor.role()) {
        return Ok(());
    }
    warn!(
        "Actor {} (role: {}) denied {:?}",
        actor.actor_id(),
        actor.role(),
        action
    );
    Err(ApiError::Unauthorized(action.denial_message().to_string()))
}
