//! Small shared helpers.

pub mod ids;
pub mod log_sanitizer;

pub use ids::parse_object_id;
pub use log_sanitizer::{mask_email, mask_username};
