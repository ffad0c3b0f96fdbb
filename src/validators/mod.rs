//! Input validators shared by request models.

pub mod common;
pub mod user;

pub use common::*;
pub use user::*;
