//! User management handlers.

use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info, warn};

use crate::constants::{
    ERR_NO_PERMISSION_DELETE_ACCOUNT, ERR_NO_PERMISSION_UPDATE_PROFILE,
    ERR_USER_NOT_FOUND, MSG_ROLE_UPDATED, MSG_USERS_FOUND, MSG_USER_COMMUNITIES, MSG_USER_COUNT,
    MSG_USER_DELETED, MSG_USER_FOUND, MSG_USER_PROFILE_RETRIEVED, MSG_USER_UPDATED,
};
use crate::errors::ApiError;
use crate::middleware::{require_access, require_actor, require_auth};
use crate::models::{
    ApiResponse, MembershipResponse, UpdateRoleRequest, UpdateUserRequest, UserResponse,
};
use crate::services::UserService;

/// List all users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "List of users", body = [UserResponse]),
        (status = 401, description = "Unauthorized", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_users(user_service: web::Data<UserService>) -> Result<HttpResponse, ApiError> {
    let users = user_service.find_all().await?;
    debug!("Listing {} users", users.len());
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_USERS_FOUND, users)))
}

/// Count registered users
#[utoipa::path(
    get,
    path = "/api/users/count",
    tag = "Users",
    responses(
        (status = 200, description = "Number of users", body = crate::models::UserCount),
        (status = 401, description = "Unauthorized", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn users_count(user_service: web::Data<UserService>) -> Result<HttpResponse, ApiError> {
    let count = user_service.users_count().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_USER_COUNT, count)))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::models::ErrorResponse),
        (status = 404, description = "User not found", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_user(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();

    let user = user_service.find_by_id(&user_id).await?.ok_or_else(|| {
        warn!("User not found with id: {}", user_id);
        ApiError::NotFound(ERR_USER_NOT_FOUND.to_string())
    })?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_USER_FOUND, user)))
}

/// Get a user by email address
#[utoipa::path(
    get,
    path = "/api/users/by-email/{email}",
    tag = "Users",
    params(
        ("email" = String, Path, description = "Email address")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::models::ErrorResponse),
        (status = 404, description = "User not found", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_user_by_email(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let email = path.into_inner().to_lowercase();

    let user = user_service
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound(ERR_USER_NOT_FOUND.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_USER_FOUND, user)))
}

/// Get the currently authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::models::ErrorResponse),
        (status = 404, description = "User not found", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_current_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;

    let user = user_service.find_by_id(&claims.sub).await?.ok_or_else(|| {
        warn!("Current user not found with id: {}", claims.sub);
        ApiError::NotFound(ERR_USER_NOT_FOUND.to_string())
    })?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_USER_PROFILE_RETRIEVED, user)))
}

/// Update a user
///
/// Admins can update any user, members can only update themselves. The
/// caller's role is read from the store, not from the token.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error", body = crate::models::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::models::ErrorResponse),
        (status = 404, description = "User not found", body = crate::models::ErrorResponse),
        (status = 409, description = "Email or user name already taken", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_user(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let actor = require_actor(&req, &user_service).await?;
    require_access(&actor, &user_id, ERR_NO_PERMISSION_UPDATE_PROFILE)?;

    if actor.role.is_admin() && actor.id != user_id {
        info!("Admin {} updating user {}", actor.id, user_id);
    }

    let changes = body.into_inner().into_changes()?;
    let updated = user_service.update_user(&user_id, changes).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_USER_UPDATED, updated)))
}

/// Delete a user account
///
/// Admins can delete any user, members can only delete themselves.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::models::ErrorResponse),
        (status = 404, description = "User not found", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_user(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let actor = require_actor(&req, &user_service).await?;
    require_access(&actor, &user_id, ERR_NO_PERMISSION_DELETE_ACCOUNT)?;

    let deleted = user_service.delete_user(&user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_USER_DELETED, deleted)))
}

/// Change a user's role (admin only)
#[utoipa::path(
    patch,
    path = "/api/users/{id}/role",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 401, description = "Not an administrator", body = crate::models::ErrorResponse),
        (status = 404, description = "User not found", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_role(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
    body: web::Json<UpdateRoleRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let actor = require_actor(&req, &user_service).await?;

    let updated = user_service
        .set_user_role(&actor, &user_id, body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_ROLE_UPDATED, updated)))
}

/// List the communities a user belongs to
#[utoipa::path(
    get,
    path = "/api/users/{id}/communities",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Memberships of the user", body = [MembershipResponse]),
        (status = 400, description = "Invalid user ID", body = crate::models::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_user_communities(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let memberships: Vec<MembershipResponse> = user_service
        .user_communities(&user_id)
        .await?
        .into_iter()
        .map(MembershipResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_USER_COMMUNITIES, memberships)))
}
