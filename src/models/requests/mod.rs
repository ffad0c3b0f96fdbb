//! Request models for API endpoints.
//!
//! Each request type derives `Validate` and exposes a conversion that runs the
//! validation pass and returns the normalized domain input.

pub mod auth;
pub mod community;
pub mod user;

pub use auth::*;
pub use community::*;
pub use user::*;
