//! Authentication and authorization helper functions.
//!
//! These helpers reduce boilerplate in handlers by providing common patterns for:
//! - Extracting claims from authenticated requests
//! - Resolving the caller's current record from the user store
//! - Checking resource access permissions

use actix_web::{HttpMessage, HttpRequest};
use log::warn;

use crate::constants::ERR_AUTH_REQUIRED;
use crate::errors::ApiError;
use crate::models::{Claims, UserResponse};
use crate::services::{Actor, UserService};

/// Access to the claims [`super::AuthMiddleware`] stored on the request.
pub trait RequestExt {
    fn get_claims(&self) -> Option<Claims>;
}

impl RequestExt for HttpRequest {
    fn get_claims(&self) -> Option<Claims> {
        self.extensions().get::<Claims>().cloned()
    }
}

/// Extract claims from request or return Unauthorized error.
///
/// # Example
/// ```ignore
/// let claims = require_auth(&req)?;
/// ```
pub fn require_auth(req: &HttpRequest) -> Result<Claims, ApiError> {
    req.get_claims().ok_or_else(|| {
        warn!("Failed to get claims from request");
        ApiError::Unauthorized(ERR_AUTH_REQUIRED.to_string())
    })
}

/// Load the authenticated user's stored record.
///
/// Admin checks must use this rather than the token's role claim, so that a
/// role change applies to tokens issued before it. A token whose subject no
/// longer exists is rejected.
pub async fn require_actor(
    req: &HttpRequest,
    users: &UserService,
) -> Result<UserResponse, ApiError> {
    let claims = require_auth(req)?;
    users.find_by_id(&claims.sub).await?.ok_or_else(|| {
        warn!("Token subject {} no longer exists", claims.sub);
        ApiError::Unauthorized(ERR_AUTH_REQUIRED.to_string())
    })
}

/// Check if the actor can access a resource (admin or owner).
///
/// # Example
/// ```ignore
/// let actor = require_actor(&req, &user_service).await?;
/// require_access(&actor, &user_id, ERR_NO_PERMISSION_UPDATE_PROFILE)?;
/// ```
pub fn require_access<A: Actor + ?Sized>(
    actor: &A,
    target_user_id: &str,
    permission_msg: &str,
) -> Result<(), ApiError> {
    if !actor.role().is_admin() && actor.actor_id() != target_user_id {
        warn!(
            "User {} (role: {}) attempted to access resource of user {}",
            actor.actor_id(),
            actor.role(),
            target_user_id
        );
        return Err(ApiError::Unauthorized(permission_msg.to_string()));
    }
    Ok(())
}
