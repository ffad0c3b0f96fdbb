//! Services organized by domain concern.

pub mod access_guard;
pub mod auth_service;
pub mod community_service;
pub mod sanitizer;
pub mod user_service;

pub use access_guard::{authorize, Action, Actor};
pub use auth_service::{AuthService, JwtSettings};
pub use community_service::CommunityService;
pub use user_service::UserService;
