//! Response models for API endpoints.

pub mod api;
pub mod community;
pub mod user;

pub use api::*;
pub use community::*;
pub use user::*;
