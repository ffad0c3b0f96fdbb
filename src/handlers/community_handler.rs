//! Community handlers: CRUD plus joining and leaving.

use actix_web::{web, HttpRequest, HttpResponse};
use log::warn;

use crate::constants::{
    ERR_COMMUNITY_NOT_FOUND, MSG_COMMUNITIES_FOUND, MSG_COMMUNITY_CREATED,
    MSG_COMMUNITY_DELETED, MSG_COMMUNITY_FOUND, MSG_COMMUNITY_JOINED, MSG_COMMUNITY_LEFT,
    MSG_COMMUNITY_MEMBERS, MSG_COMMUNITY_UPDATED,
};
use crate::errors::ApiError;
use crate::middleware::{require_actor, require_auth};
use crate::models::{
    ApiResponse, CommunityResponse, CreateCommunityRequest, MembershipResponse,
    UpdateCommunityRequest,
};
use crate::services::{CommunityService, UserService};

/// Create a community
#[utoipa::path(
    post,
    path = "/api/communities",
    tag = "Communities",
    request_body = CreateCommunityRequest,
    responses(
        (status = 201, description = "Community created", body = CommunityResponse),
        (status = 400, description = "Validation error", body = crate::models::ErrorResponse),
        (status = 409, description = "Name already taken", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_community(
    community_service: web::Data<CommunityService>,
    body: web::Json<CreateCommunityRequest>,
) -> Result<HttpResponse, ApiError> {
    let new_community = body.into_inner().into_new_community()?;
    let community = community_service.create(new_community).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        MSG_COMMUNITY_CREATED,
        CommunityResponse::from(community),
    )))
}

/// List all communities
#[utoipa::path(
    get,
    path = "/api/communities",
    tag = "Communities",
    responses(
        (status = 200, description = "All communities", body = [CommunityResponse])
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_communities(
    community_service: web::Data<CommunityService>,
) -> Result<HttpResponse, ApiError> {
    let communities: Vec<CommunityResponse> = community_service
        .find_all()
        .await?
        .into_iter()
        .map(CommunityResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_COMMUNITIES_FOUND, communities)))
}

/// Get a community by ID
#[utoipa::path(
    get,
    path = "/api/communities/{id}",
    tag = "Communities",
    params(
        ("id" = String, Path, description = "Community ID")
    ),
    responses(
        (status = 200, description = "Community found", body = CommunityResponse),
        (status = 404, description = "Community not found", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_community(
    community_service: web::Data<CommunityService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let community = community_service.find_by_id(&id).await?.ok_or_else(|| {
        warn!("Community not found with id: {}", id);
        ApiError::NotFound(ERR_COMMUNITY_NOT_FOUND.to_string())
    })?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        MSG_COMMUNITY_FOUND,
        CommunityResponse::from(community),
    )))
}

/// Update a community (admin only)
#[utoipa::path(
    put,
    path = "/api/communities/{id}",
    tag = "Communities",
    params(
        ("id" = String, Path, description = "Community ID")
    ),
    request_body = UpdateCommunityRequest,
    responses(
        (status = 200, description = "Community updated", body = CommunityResponse),
        (status = 401, description = "Not an administrator", body = crate::models::ErrorResponse),
        (status = 404, description = "Community not found", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_community(
    community_service: web::Data<CommunityService>,
    user_service: web::Data<UserService>,
    path: web::Path<String>,
    body: web::Json<UpdateCommunityRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor = require_actor(&req, &user_service).await?;
    let changes = body.into_inner().into_changes()?;
    let community = community_service
        .update(&actor, &path.into_inner(), changes)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        MSG_COMMUNITY_UPDATED,
        CommunityResponse::from(community),
    )))
}

/// Delete a community and its memberships (admin only)
#[utoipa::path(
    delete,
    path = "/api/communities/{id}",
    tag = "Communities",
    params(
        ("id" = String, Path, description = "Community ID")
    ),
    responses(
        (status = 200, description = "Community deleted", body = CommunityResponse),
        (status = 401, description = "Not an administrator", body = crate::models::ErrorResponse),
        (status = 404, description = "Community not found", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_community(
    community_service: web::Data<CommunityService>,
    user_service: web::Data<UserService>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor = require_actor(&req, &user_service).await?;
    let community = community_service
        .delete(&actor, &path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        MSG_COMMUNITY_DELETED,
        CommunityResponse::from(community),
    )))
}

/// List members of a community
#[utoipa::path(
    get,
    path = "/api/communities/{id}/members",
    tag = "Communities",
    params(
        ("id" = String, Path, description = "Community ID")
    ),
    responses(
        (status = 200, description = "Memberships", body = [MembershipResponse]),
        (status = 400, description = "Invalid community ID", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_community_members(
    community_service: web::Data<CommunityService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let members: Vec<MembershipResponse> = community_service
        .members(&path.into_inner())
        .await?
        .into_iter()
        .map(MembershipResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_COMMUNITY_MEMBERS, members)))
}

/// Join a community as the authenticated user
#[utoipa::path(
    post,
    path = "/api/communities/{id}/join",
    tag = "Communities",
    params(
        ("id" = String, Path, description = "Community ID")
    ),
    responses(
        (status = 201, description = "Joined", body = MembershipResponse),
        (status = 404, description = "User or community not found", body = crate::models::ErrorResponse),
        (status = 409, description = "Already a member", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn join_community(
    community_service: web::Data<CommunityService>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    let membership = community_service
        .join(&claims.sub, &path.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        MSG_COMMUNITY_JOINED,
        MembershipResponse::from(membership),
    )))
}

/// Leave a community as the authenticated user
#[utoipa::path(
    delete,
    path = "/api/communities/{id}/join",
    tag = "Communities",
    params(
        ("id" = String, Path, description = "Community ID")
    ),
    responses(
        (status = 200, description = "Left", body = MembershipResponse),
        (status = 404, description = "Not a member", body = crate::models::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn leave_community(
    community_service: web::Data<CommunityService>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    let membership = community_service
        .leave(&claims.sub, &path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        MSG_COMMUNITY_LEFT,
        MembershipResponse::from(membership),
    )))
}
