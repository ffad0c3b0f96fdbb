use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::models::{
    AuthResponse, CommunityResponse, CreateCommunityRequest, ErrorResponse, HealthResponse,
    LoginRequest, MembershipResponse, RegisterRequest, Role, UpdateCommunityRequest,
    UpdateRoleRequest, UpdateUserRequest, UserCount, UserResponse,
};

/// OpenAPI documentation for the Community Hub API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Community Hub API",
        version = "0.1.0",
        description = "Users, roles and community memberships behind JWT authentication.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Authentication", description = "Registration and login"),
        (name = "Users", description = "User lookup, profile updates and role changes"),
        (name = "Communities", description = "Community CRUD and membership")
    ),
    paths(
        crate::routes::health_check,
        crate::handlers::register,
        crate::handlers::login,
        crate::handlers::get_users,
        crate::handlers::users_count,
        crate::handlers::get_current_user,
        crate::handlers::get_user_by_email,
        crate::handlers::get_user,
        crate::handlers::update_user,
        crate::handlers::delete_user,
        crate::handlers::update_role,
        crate::handlers::get_user_communities,
        crate::handlers::create_community,
        crate::handlers::get_communities,
        crate::handlers::get_community,
        crate::handlers::update_community,
        crate::handlers::delete_community,
        crate::handlers::get_community_members,
        crate::handlers::join_community,
        crate::handlers::leave_community
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            UpdateUserRequest,
            UpdateRoleRequest,
            CreateCommunityRequest,
            UpdateCommunityRequest,
            Role,
            UserResponse,
            UserCount,
            AuthResponse,
            CommunityResponse,
            MembershipResponse,
            ErrorResponse,
            HealthResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "JWT token obtained from the /api/auth/login endpoint",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_community_and_user_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/users/{id}/role",
            "/api/users/count",
            "/api/communities/{id}/join",
            "/api/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
