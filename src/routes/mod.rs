use std::sync::Arc;

use actix_governor::Governor;
use actix_web::{web, HttpResponse};
use utoipa::OpenApi;

use crate::handlers;
use crate::middleware::{AuthMiddleware, LoginRateLimit};
use crate::models::HealthResponse;
use crate::openapi::ApiDoc;

/// Per-process settings the route table needs beyond app data.
#[derive(Clone)]
pub struct RouteSettings {
    pub jwt_secret: Arc<str>,
    pub login_limit: LoginRateLimit,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, settings: &RouteSettings) {
    let auth = AuthMiddleware::new(Arc::clone(&settings.jwt_secret));

    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health_check))
            .route("/openapi.json", web::get().to(openapi_json))
            // Auth routes (public)
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::register))
                    .service(
                        web::resource("/login")
                            .wrap(Governor::new(&settings.login_limit))
                            .route(web::post().to(handlers::login)),
                    ),
            )
            // User routes (protected)
            .service(
                web::scope("/users")
                    .wrap(auth.clone())
                    .route("", web::get().to(handlers::get_users))
                    // Fixed segments must be registered before /{id}
                    .route("/count", web::get().to(handlers::users_count))
                    .route("/me", web::get().to(handlers::get_current_user))
                    .route(
                        "/by-email/{email}",
                        web::get().to(handlers::get_user_by_email),
                    )
                    .route("/{id}", web::get().to(handlers::get_user))
                    .route("/{id}", web::put().to(handlers::update_user))
                    .route("/{id}", web::delete().to(handlers::delete_user))
                    .route("/{id}/role", web::patch().to(handlers::update_role))
                    .route(
                        "/{id}/communities",
                        web::get().to(handlers::get_user_communities),
                    ),
            )
            // Community routes (protected)
            .service(
                web::scope("/communities")
                    .wrap(auth)
                    .route("", web::post().to(handlers::create_community))
                    .route("", web::get().to(handlers::get_communities))
                    .route("/{id}", web::get().to(handlers::get_community))
                    .route("/{id}", web::put().to(handlers::update_community))
                    .route("/{id}", web::delete().to(handlers::delete_community))
                    .route(
                        "/{id}/members",
                        web::get().to(handlers::get_community_members),
                    )
                    .route("/{id}/join", web::post().to(handlers::join_community))
                    .route("/{id}/join", web::delete().to(handlers::leave_community)),
            ),
    );
}

/// Health check
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server is running", body = HealthResponse)
    )
)]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "OK".to_string(),
        message: "Server is running".to_string(),
    })
}

async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use crate::middleware::create_login_rate_limiter_config;
    use crate::models::{NewUser, Role};
    use crate::repositories::InMemoryStore;
    use crate::services::{AuthService, CommunityService, JwtSettings, UserService};

    const SECRET: &str = "route-test-secret";
    const PASSWORD: &str = "password123";
    const TEST_COST: u32 = 4;

    struct TestState {
        users: web::Data<UserService>,
        auth: web::Data<AuthService>,
        communities: web::Data<CommunityService>,
        settings: RouteSettings,
    }

    fn state() -> TestState {
        let store = Arc::new(InMemoryStore::new());
        let users = Arc::new(UserService::new(
            store.clone(),
            store.clone(),
            TEST_COST,
        ));
        let auth = AuthService::new(
            Arc::clone(&users),
            JwtSettings {
                secret: SECRET.to_string(),
                expiration_hours: 1,
            },
        );
        TestState {
            users: web::Data::from(users),
            auth: web::Data::new(auth),
            communities: web::Data::new(CommunityService::new(
                store.clone(),
                store.clone(),
                store,
            )),
            settings: RouteSettings {
                jwt_secret: Arc::from(SECRET),
                login_limit: create_login_rate_limiter_config().unwrap(),
            },
        }
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.users.clone())
                    .app_data($state.auth.clone())
                    .app_data($state.communities.clone())
                    .configure(|cfg| configure_routes(cfg, &$state.settings)),
            )
            .await
        };
    }

    /// Status of a response, whether a handler or a middleware produced it.
    macro_rules! status_of {
        ($app:expr, $req:expr) => {
            match test::try_call_service(&$app, $req.to_request()).await {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            }
        };
    }

    async fn seed(state: &TestState, email: &str, user_name: &str, role: Role) -> String {
        state
            .users
            .create(NewUser {
                email: email.to_string(),
                user_name: user_name.to_string(),
                password: PASSWORD.to_string(),
                role,
            })
            .await
            .unwrap()
            .id
    }

    macro_rules! login {
        ($app:expr, $login:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/auth/login")
                .peer_addr("127.0.0.1:40000".parse().unwrap())
                .set_json(json!({ "login": $login, "password": PASSWORD }))
                .to_request();
            let body: Value = test::call_and_read_body_json(&$app, req).await;
            body["token"].as_str().unwrap().to_string()
        }};
    }

    fn bearer(token: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {token}"))
    }

    fn assert_no_password(value: &Value) {
        match value {
            Value::Object(map) => {
                assert!(!map.contains_key("password"), "password leaked: {value}");
                map.values().for_each(assert_no_password);
            }
            Value::Array(items) => items.iter().for_each(assert_no_password),
            _ => {}
        }
    }

    #[actix_web::test]
    async fn test_health_is_public() {
        let state = state();
        let app = app!(state);
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "OK");
    }

    #[actix_web::test]
    async fn test_register_login_and_profile_never_expose_password() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "email": "Zed@Example.com",
                "user_name": "zed",
                "password": PASSWORD
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_no_password(&body);
        assert_eq!(body["data"]["email"], "zed@example.com");
        assert_eq!(body["data"]["role"], "member");

        let token = login!(app, "zed");
        for uri in ["/api/users", "/api/users/me", "/api/users/by-email/ZED@example.com"] {
            let req = test::TestRequest::get()
                .uri(uri)
                .insert_header(bearer(&token))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["success"], true, "{uri}");
            assert_no_password(&body);
        }

        let req = test::TestRequest::get()
            .uri("/api/users/count")
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["count"], 1);
    }

    #[actix_web::test]
    async fn test_protected_routes_require_a_valid_token() {
        let state = state();
        let app = app!(state);

        let missing = test::TestRequest::get().uri("/api/users");
        assert_eq!(status_of!(app, missing), StatusCode::UNAUTHORIZED);

        let forged = test::TestRequest::get()
            .uri("/api/communities")
            .insert_header(bearer("not-a-token"));
        assert_eq!(status_of!(app, forged), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_unknown_user_is_not_found() {
        let state = state();
        let app = app!(state);
        seed(&state, "m@x.com", "member", Role::Member).await;
        let token = login!(app, "member");

        for id in [mongodb::bson::oid::ObjectId::new().to_hex(), "garbage".to_string()] {
            let req = test::TestRequest::get()
                .uri(&format!("/api/users/{id}"))
                .insert_header(bearer(&token))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND);
            let body: Value = test::read_body_json(res).await;
            assert_eq!(body["code"], "NOT_FOUND");
        }
    }

    #[actix_web::test]
    async fn test_only_admins_change_roles() {
        let state = state();
        let app = app!(state);
        seed(&state, "admin@x.com", "admin", Role::Admin).await;
        let target = seed(&state, "m@x.com", "member", Role::Member).await;

        let member_token = login!(app, "member");
        let denied = test::TestRequest::patch()
            .uri(&format!("/api/users/{target}/role"))
            .insert_header(bearer(&member_token))
            .set_json(json!({ "role": "admin" }));
        assert_eq!(status_of!(app, denied), StatusCode::UNAUTHORIZED);

        let admin_token = login!(app, "admin");
        let req = test::TestRequest::patch()
            .uri(&format!("/api/users/{target}/role"))
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "role": "admin" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["role"], "admin");
        assert_no_password(&body);
    }

    #[actix_web::test]
    async fn test_members_cannot_edit_other_profiles() {
        let state = state();
        let app = app!(state);
        let first = seed(&state, "a@x.com", "first", Role::Member).await;
        seed(&state, "b@x.com", "second", Role::Member).await;
        let token = login!(app, "second");

        let update = test::TestRequest::put()
            .uri(&format!("/api/users/{first}"))
            .insert_header(bearer(&token))
            .set_json(json!({ "user_name": "hijacked" }));
        assert_eq!(status_of!(app, update), StatusCode::UNAUTHORIZED);

        let delete = test::TestRequest::delete()
            .uri(&format!("/api/users/{first}"))
            .insert_header(bearer(&token));
        assert_eq!(status_of!(app, delete), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_community_membership_flow() {
        let state = state();
        let app = app!(state);
        seed(&state, "admin@x.com", "admin", Role::Admin).await;
        let member_id = seed(&state, "m@x.com", "member", Role::Member).await;
        let member_token = login!(app, "member");
        let admin_token = login!(app, "admin");

        let req = test::TestRequest::post()
            .uri("/api/communities")
            .insert_header(bearer(&member_token))
            .set_json(json!({ "name": "Zoolea", "description": "This Is Zoolea" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["name"], "zoolea");
        let community_id = body["data"]["id"].as_str().unwrap().to_string();

        let join = test::TestRequest::post()
            .uri(&format!("/api/communities/{community_id}/join"))
            .insert_header(bearer(&member_token));
        assert_eq!(status_of!(app, join), StatusCode::CREATED);
        let again = test::TestRequest::post()
            .uri(&format!("/api/communities/{community_id}/join"))
            .insert_header(bearer(&member_token));
        assert_eq!(status_of!(app, again), StatusCode::CONFLICT);

        let req = test::TestRequest::get()
            .uri(&format!("/api/users/{member_id}/communities"))
            .insert_header(bearer(&member_token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"][0]["community_id"], community_id.as_str());

        let member_delete = test::TestRequest::delete()
            .uri(&format!("/api/communities/{community_id}"))
            .insert_header(bearer(&member_token));
        assert_eq!(
            status_of!(app, member_delete),
            StatusCode::UNAUTHORIZED
        );

        let admin_delete = test::TestRequest::delete()
            .uri(&format!("/api/communities/{community_id}"))
            .insert_header(bearer(&admin_token));
        assert_eq!(status_of!(app, admin_delete), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&format!("/api/communities/{community_id}/members"))
            .insert_header(bearer(&admin_token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"], json!([]));
    }

    #[actix_web::test]
    async fn test_demoted_admin_loses_admin_rights_with_old_token() {
        let state = state();
        let app = app!(state);
        let boss = seed(&state, "boss@x.com", "boss", Role::Admin).await;
        let old_admin = seed(&state, "old@x.com", "oldadmin", Role::Admin).await;
        let bystander = seed(&state, "m@x.com", "member", Role::Member).await;
        let community = state
            .communities
            .create(crate::models::NewCommunity {
                name: "zoolea".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let community_id = community.id.to_hex();

        let stale_token = login!(app, "oldadmin");
        let boss_actor = state.users.find_by_id(&boss).await.unwrap().unwrap();
        state
            .users
            .set_user_role(
                &boss_actor,
                &old_admin,
                crate::models::UpdateRoleRequest { role: Role::Member },
            )
            .await
            .unwrap();

        let delete = test::TestRequest::delete()
            .uri(&format!("/api/communities/{community_id}"))
            .insert_header(bearer(&stale_token));
        assert_eq!(status_of!(app, delete), StatusCode::UNAUTHORIZED);

        let update = test::TestRequest::put()
            .uri(&format!("/api/communities/{community_id}"))
            .insert_header(bearer(&stale_token))
            .set_json(json!({ "name": "renamed" }));
        assert_eq!(status_of!(app, update), StatusCode::UNAUTHORIZED);

        let edit_user = test::TestRequest::put()
            .uri(&format!("/api/users/{bystander}"))
            .insert_header(bearer(&stale_token))
            .set_json(json!({ "user_name": "hijacked" }));
        assert_eq!(status_of!(app, edit_user), StatusCode::UNAUTHORIZED);

        let delete_user = test::TestRequest::delete()
            .uri(&format!("/api/users/{bystander}"))
            .insert_header(bearer(&stale_token));
        assert_eq!(status_of!(app, delete_user), StatusCode::UNAUTHORIZED);

        assert!(state.communities.find_by_id(&community_id).await.unwrap().is_some());
        assert!(state.users.find_by_id(&bystander).await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn test_deleted_user_leaves_no_memberships_and_cannot_rejoin() {
        let state = state();
        let app = app!(state);
        let member = seed(&state, "m@x.com", "member", Role::Member).await;
        let token = login!(app, "member");
        let community = state
            .communities
            .create(crate::models::NewCommunity {
                name: "zoolea".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let community_id = community.id.to_hex();
        state.communities.join(&member, &community_id).await.unwrap();

        let delete = test::TestRequest::delete()
            .uri(&format!("/api/users/{member}"))
            .insert_header(bearer(&token));
        assert_eq!(status_of!(app, delete), StatusCode::OK);

        assert!(state.communities.members(&community_id).await.unwrap().is_empty());
        assert!(state.users.user_communities(&member).await.unwrap().is_empty());

        let rejoin = test::TestRequest::post()
            .uri(&format!("/api/communities/{community_id}/join"))
            .insert_header(bearer(&token));
        assert_eq!(status_of!(app, rejoin), StatusCode::NOT_FOUND);
        assert!(state.communities.members(&community_id).await.unwrap().is_empty());
    }
}
