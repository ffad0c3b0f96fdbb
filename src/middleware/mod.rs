//! Request middleware and helpers for authenticated handlers.

pub mod auth_helpers;
pub mod auth_middleware;
pub mod rate_limiter;

pub use auth_helpers::*;
pub use auth_middleware::AuthMiddleware;
pub use rate_limiter::{create_login_rate_limiter_config, LoginRateLimit};
