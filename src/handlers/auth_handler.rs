//! Authentication handlers for user registration and login.

use actix_web::{web, HttpResponse};
use log::info;
use validator::Validate;

use crate::constants::{MSG_LOGIN_SUCCESS, MSG_USER_REGISTERED};
use crate::errors::ApiError;
use crate::models::{ApiResponse, AuthResponse, LoginRequest, RegisterRequest};
use crate::services::{AuthService, UserService};
use crate::validators::validation_errors_to_api_error;

/// Register a new member account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = crate::models::UserResponse),
        (status = 400, description = "Validation error", body = crate::models::ErrorResponse),
        (status = 409, description = "Email or user name already exists", body = crate::models::ErrorResponse)
    )
)]
pub async fn register(
    user_service: web::Data<UserService>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let new_user = body.into_inner().into_new_user()?;
    let user = user_service.create(new_user).await?;

    info!("Registered user {}", user.id);
    Ok(HttpResponse::Created().json(ApiResponse::success(MSG_USER_REGISTERED, user)))
}

/// Authenticate with email or user name and get a JWT token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = crate::models::AuthResponse),
        (status = 400, description = "Validation error", body = crate::models::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::models::ErrorResponse)
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate().map_err(validation_errors_to_api_error)?;

    let (user, token) = auth_service.login(body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        success: true,
        message: MSG_LOGIN_SUCCESS.to_string(),
        token,
        user,
    }))
}
