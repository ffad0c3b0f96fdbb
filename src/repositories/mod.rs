//! Record store layer.
//!
//! Services depend on the traits defined here and receive an implementation
//! at construction time. `mongo` backs production; `memory` backs local runs
//! and tests.

pub mod community_repository;
pub mod memory;
pub mod user_repository;

pub use community_repository::{
    CommunityRepository, MembershipRepository, MongoCommunityRepository,
    MongoMembershipRepository,
};
pub use memory::InMemoryStore;
pub use user_repository::{MongoUserRepository, UserRepository};

#[cfg(test)]
pub use community_repository::{MockCommunityRepository, MockMembershipRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;

use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

/// MongoDB server code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

/// Failures surfaced by record store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The addressed record does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    /// A uniqueness or required-field constraint rejected the write.
    #[error("constraint violation: {message}")]
    ConstraintViolation { message: String },
    /// Connectivity, driver or serialization failure.
    #[error("record store failure: {message}")]
    Backend { message: String },
}

impl RepositoryError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

impl From<mongodb::error::Error> for RepositoryError {
    fn from(err: mongodb::error::Error) -> Self {
        let duplicate = match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
                write_error.code == DUPLICATE_KEY
            }
            ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
            _ => false,
        };

        if duplicate {
            RepositoryError::constraint(err.to_string())
        } else {
            RepositoryError::backend(err.to_string())
        }
    }
}
