//! User service: CRUD over the user store, password hashing, credential
//! redaction and the role-change guard.

use std::sync::Arc;

use log::{debug, info, warn};
use mongodb::bson::{oid::ObjectId, DateTime};

use crate::config::AdminSeed;
use crate::constants::{ERR_DUPLICATE_USER, ERR_INVALID_USER_ID};
use crate::errors::ApiError;
use crate::models::{
    CommunityMembership, NewUser, Role, UpdateRoleRequest, User, UserChanges, UserCount,
    UserFilter, UserResponse, UserUpdate,
};
use crate::repositories::{MembershipRepository, RepositoryError, UserRepository};
use crate::services::auth_service::hash_password;
use crate::services::{authorize, Action, Actor};
use crate::services::sanitizer::{sanitize, sanitize_all};
use crate::utils::{mask_email, parse_object_id};

pub struct UserService {
    users: Arc<dyn UserRepository>,
    memberships: Arc<dyn MembershipRepository>,
    hash_cost: u32,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        memberships: Arc<dyn MembershipRepository>,
        hash_cost: u32,
    ) -> Self {
        Self {
            users,
            memberships,
            hash_cost,
        }
    }

    pub async fn create(&self, new_user: NewUser) -> Result<UserResponse, ApiError> {
        info!("Creating user {}", mask_email(&new_user.email));

        let password = hash_password(&new_user.password, self.hash_cost)?;
        let now = DateTime::now();
        let user = User {
            id: ObjectId::new(),
            email: new_user.email,
            user_name: new_user.user_name,
            password,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };

        let created = self.users.insert(user).await.map_err(duplicate_user)?;
        Ok(created.into())
    }

    pub async fn find_all(&self) -> Result<Vec<UserResponse>, ApiError> {
        Ok(sanitize_all(self.users.find_all().await?))
    }

    /// Look a user up by id. Unknown and malformed ids both yield `None`.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<UserResponse>, ApiError> {
        debug!("Fetching user by ID: {}", id);
        let Ok(object_id) = ObjectId::parse_str(id) else {
            debug!("Ignoring malformed user ID: {}", id);
            return Ok(None);
        };
        Ok(sanitize(self.users.find_by_id(&object_id).await?))
    }

    /// Raw lookup by email or user name, password hash included.
    ///
    /// Reserved for authentication; every other read goes through the sanitizer.
    pub async fn find_by_login_details(&self, field: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .find_first(&UserFilter::LoginDetails(field.to_string()))
            .await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserResponse>, ApiError> {
        debug!("Fetching user by email: {}", mask_email(email));
        let user = self
            .users
            .find_first(&UserFilter::Email(email.to_string()))
            .await?;
        Ok(sanitize(user))
    }

    pub async fn users_count(&self) -> Result<UserCount, ApiError> {
        let count = self.users.count().await?;
        Ok(UserCount { count })
    }

    /// Change a user's role. Only admins may do this; the check runs before
    /// any store access.
    pub async fn set_user_role<A: Actor + ?Sized>(
        &self,
        actor: &A,
        id: &str,
        request: UpdateRoleRequest,
    ) -> Result<UserResponse, ApiError> {
        authorize(actor, Action::ChangeRole)?;

        let object_id = parse_object_id(id, ERR_INVALID_USER_ID)?;
        let updated = self
            .users
            .update(&object_id, UserUpdate::role(request.role))
            .await?;

        info!(
            "Actor {} set role of user {} to {}",
            actor.actor_id(),
            id,
            updated.role
        );
        Ok(updated.into())
    }

    pub async fn update_user(
        &self,
        id: &str,
        changes: UserChanges,
    ) -> Result<UserResponse, ApiError> {
        info!("Updating user {}", id);
        let object_id = parse_object_id(id, ERR_INVALID_USER_ID)?;

        let password_hash = changes
            .password
            .as_deref()
            .map(|password| hash_password(password, self.hash_cost))
            .transpose()?;

        let update = UserUpdate {
            email: changes.email,
            user_name: changes.user_name,
            password_hash,
            role: None,
        };
        if update.is_empty() {
            debug!("No field changes for user {}, touching updated_at only", id);
        }

        let updated = self
            .users
            .update(&object_id, update)
            .await
            .map_err(duplicate_user)?;
        Ok(updated.into())
    }

    pub async fn user_communities(
        &self,
        user_id: &str,
    ) -> Result<Vec<CommunityMembership>, ApiError> {
        let object_id = parse_object_id(user_id, ERR_INVALID_USER_ID)?;
        Ok(self.memberships.find_by_user(&object_id).await?)
    }

    /// Delete a user and their memberships, returning the user's last known state.
    pub async fn delete_user(&self, id: &str) -> Result<UserResponse, ApiError> {
        info!("Deleting user {}", id);
        let object_id = parse_object_id(id, ERR_INVALID_USER_ID)?;
        let deleted = self.users.delete(&object_id).await?;
        let removed = self.memberships.delete_for_user(&object_id).await?;
        debug!("Removed {} memberships of user {}", removed, id);
        Ok(deleted.into())
    }

    /// Create the initial administrator unless an admin already exists or the
    /// configured email or user name is taken. Returns the created admin.
    pub async fn seed_admin(&self, seed: &AdminSeed) -> Result<Option<UserResponse>, ApiError> {
        if self
            .users
            .find_first(&UserFilter::Role(Role::Admin))
            .await?
            .is_some()
        {
            info!("Admin user already exists, skipping seed");
            return Ok(None);
        }

        let email_taken = self
            .users
            .find_first(&UserFilter::Email(seed.email.clone()))
            .await?
            .is_some();
        let name_taken = self
            .users
            .find_first(&UserFilter::LoginDetails(seed.user_name.clone()))
            .await?
            .is_some();
        if email_taken || name_taken {
            warn!(
                "Cannot seed admin: {} or {} belongs to a non-admin user",
                mask_email(&seed.email),
                seed.user_name
            );
            return Ok(None);
        }

        let admin = self
            .create(NewUser {
                email: seed.email.clone(),
                user_name: seed.user_name.clone(),
                password: seed.password.clone(),
                role: Role::Admin,
            })
            .await?;
        info!("Admin user {} created", admin.id);
        Ok(Some(admin))
    }
}

fn duplicate_user(err: RepositoryError) -> ApiError {
    match err {
        RepositoryError::ConstraintViolation { .. } => {
            ApiError::Conflict(ERR_DUPLICATE_USER.to_string())
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{InMemoryStore, MockMembershipRepository, MockUserRepository};
    use crate::services::auth_service::verify_password;

    const TEST_COST: u32 = 4;

    fn service() -> (UserService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let service = UserService::new(store.clone(), store.clone(), TEST_COST);
        (service, store)
    }

    fn new_user(email: &str, user_name: &str, role: Role) -> NewUser {
        NewUser {
            email: email.to_string(),
            user_name: user_name.to_string(),
            password: "p".to_string(),
            role,
        }
    }

    fn stored_user(role: Role) -> User {
        User {
            id: ObjectId::new(),
            email: "admin@x.com".to_string(),
            user_name: "admin".to_string(),
            password: "hash".to_string(),
            role,
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    #[actix_web::test]
    async fn test_login_lookup_keeps_password_email_lookup_strips_it() {
        let (service, _) = service();
        let created = service
            .create(new_user("a@x.com", "abc", Role::Member))
            .await
            .unwrap();

        let raw = service
            .find_by_login_details("a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw.id.to_hex(), created.id);
        assert!(!raw.password.is_empty());
        assert!(verify_password("p", &raw.password).unwrap());

        let by_name = service.find_by_login_details("abc").await.unwrap().unwrap();
        assert_eq!(by_name.id, raw.id);

        let public = service.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(public, created);
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("password").is_none());
    }

    #[actix_web::test]
    async fn test_login_lookup_absent_when_nothing_matches() {
        let (service, _) = service();
        service
            .create(new_user("a@x.com", "abc", Role::Member))
            .await
            .unwrap();
        assert!(service
            .find_by_login_details("zzz")
            .await
            .unwrap()
            .is_none());
        assert!(service.find_by_email("abc").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_password_is_hashed_before_storage() {
        let (service, store) = service();
        let created = service
            .create(new_user("a@x.com", "abc", Role::Member))
            .await
            .unwrap();
        let stored = UserRepository::find_by_id(
            &*store,
            &ObjectId::parse_str(&created.id).unwrap(),
        )
        .await
        .unwrap()
        .unwrap();
        assert_ne!(stored.password, "p");
    }

    #[actix_web::test]
    async fn test_find_by_id_missing_is_none_not_error() {
        let (service, _) = service();
        assert_eq!(
            service
                .find_by_id(&ObjectId::new().to_hex())
                .await
                .unwrap(),
            None
        );
        assert_eq!(service.find_by_id("not-an-id").await.unwrap(), None);
    }

    #[actix_web::test]
    async fn test_users_count_tracks_inserts() {
        let (service, _) = service();
        assert_eq!(service.users_count().await.unwrap(), UserCount { count: 0 });
        for i in 0..3 {
            service
                .create(new_user(&format!("u{i}@x.com"), &format!("user{i}"), Role::Member))
                .await
                .unwrap();
        }
        assert_eq!(service.users_count().await.unwrap(), UserCount { count: 3 });
        assert_eq!(service.find_all().await.unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn test_admin_promotes_member() {
        let (service, _) = service();
        let admin = service
            .create(new_user("admin@x.com", "admin", Role::Admin))
            .await
            .unwrap();
        let member = service
            .create(new_user("m@x.com", "member", Role::Member))
            .await
            .unwrap();

        let updated = service
            .set_user_role(&admin, &member.id, UpdateRoleRequest { role: Role::Admin })
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Admin);

        let reloaded = service.find_by_id(&member.id).await.unwrap().unwrap();
        assert_eq!(reloaded.role, Role::Admin);
    }

    #[actix_web::test]
    async fn test_member_cannot_change_roles_and_target_is_unchanged() {
        let (service, _) = service();
        let member = service
            .create(new_user("m@x.com", "member", Role::Member))
            .await
            .unwrap();
        let target = service
            .create(new_user("t@x.com", "target", Role::Member))
            .await
            .unwrap();

        let result = service
            .set_user_role(&member, &target.id, UpdateRoleRequest { role: Role::Admin })
            .await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));

        let reloaded = service.find_by_id(&target.id).await.unwrap().unwrap();
        assert_eq!(reloaded.role, Role::Member);
    }

    #[actix_web::test]
    async fn test_denied_role_change_never_touches_the_store() {
        let mut users = MockUserRepository::new();
        users.expect_update().never();
        users.expect_find_by_id().never();
        users.expect_find_first().never();
        let service = UserService::new(
            Arc::new(users),
            Arc::new(MockMembershipRepository::new()),
            TEST_COST,
        );

        let member = stored_user(Role::Member);
        let result = service
            .set_user_role(
                &member,
                &ObjectId::new().to_hex(),
                UpdateRoleRequest { role: Role::Admin },
            )
            .await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[actix_web::test]
    async fn test_granted_role_change_issues_exactly_one_update() {
        let target = stored_user(Role::Member);
        let target_id = target.id;
        let promoted = User {
            role: Role::Admin,
            ..target
        };

        let mut users = MockUserRepository::new();
        users
            .expect_update()
            .withf(move |id: &ObjectId, update: &UserUpdate| {
                *id == target_id && *update == UserUpdate::role(Role::Admin)
            })
            .times(1)
            .returning(move |_, _| Ok(promoted.clone()));
        let service = UserService::new(
            Arc::new(users),
            Arc::new(MockMembershipRepository::new()),
            TEST_COST,
        );

        let admin = stored_user(Role::Admin);
        let updated = service
            .set_user_role(
                &admin,
                &target_id.to_hex(),
                UpdateRoleRequest { role: Role::Admin },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Admin);
    }

    #[actix_web::test]
    async fn test_update_and_delete_missing_user_propagate_not_found() {
        let (service, _) = service();
        let missing = ObjectId::new().to_hex();

        let update = service
            .update_user(
                &missing,
                UserChanges {
                    user_name: Some("nobody".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(update, Err(ApiError::NotFound(_))));

        let delete = service.delete_user(&missing).await;
        assert!(matches!(delete, Err(ApiError::NotFound(_))));
    }

    #[actix_web::test]
    async fn test_update_rehashes_password() {
        let (service, store) = service();
        let created = service
            .create(new_user("a@x.com", "abc", Role::Member))
            .await
            .unwrap();

        let updated = service
            .update_user(
                &created.id,
                UserChanges {
                    password: Some("new-password".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.user_name, "abc");

        let raw = UserRepository::find_by_id(
            &*store,
            &ObjectId::parse_str(&created.id).unwrap(),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(verify_password("new-password", &raw.password).unwrap());
    }

    #[actix_web::test]
    async fn test_delete_returns_sanitized_prior_state() {
        let (service, _) = service();
        let created = service
            .create(new_user("a@x.com", "abc", Role::Member))
            .await
            .unwrap();
        let deleted = service.delete_user(&created.id).await.unwrap();
        assert_eq!(deleted, created);
        assert_eq!(service.find_by_id(&created.id).await.unwrap(), None);
    }

    #[actix_web::test]
    async fn test_duplicate_email_surfaces_as_conflict() {
        let (service, _) = service();
        service
            .create(new_user("a@x.com", "abc", Role::Member))
            .await
            .unwrap();
        let result = service
            .create(new_user("a@x.com", "xyz", Role::Member))
            .await;
        assert_eq!(
            result,
            Err(ApiError::Conflict(ERR_DUPLICATE_USER.to_string()))
        );
    }

    #[actix_web::test]
    async fn test_user_communities_reads_memberships() {
        let target = ObjectId::new();
        let membership = CommunityMembership {
            id: ObjectId::new(),
            user_id: target,
            community_id: ObjectId::new(),
            joined_at: DateTime::now(),
        };
        let expected = vec![membership.clone()];

        let mut memberships = MockMembershipRepository::new();
        memberships
            .expect_find_by_user()
            .withf(move |id: &ObjectId| *id == target)
            .times(1)
            .returning(move |_| Ok(vec![membership.clone()]));
        let service = UserService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(memberships),
            TEST_COST,
        );

        let found = service.user_communities(&target.to_hex()).await.unwrap();
        assert_eq!(found, expected);
    }

    #[actix_web::test]
    async fn test_malformed_id_is_bad_request_for_mutations() {
        let (service, _) = service();
        let result = service.delete_user("zzz").await;
        assert_eq!(
            result,
            Err(ApiError::BadRequest(ERR_INVALID_USER_ID.to_string()))
        );
    }

    fn admin_seed() -> AdminSeed {
        AdminSeed {
            email: "root@x.com".to_string(),
            user_name: "root".to_string(),
            password: "s3cret-pass".to_string(),
        }
    }

    #[actix_web::test]
    async fn test_seed_admin_runs_once() {
        let (service, _) = service();
        let seeded = service.seed_admin(&admin_seed()).await.unwrap().unwrap();
        assert_eq!(seeded.role, Role::Admin);
        assert_eq!(seeded.user_name, "root");

        assert_eq!(service.seed_admin(&admin_seed()).await.unwrap(), None);
        assert_eq!(service.users_count().await.unwrap(), UserCount { count: 1 });

        let raw = service.find_by_login_details("root").await.unwrap().unwrap();
        assert!(verify_password("s3cret-pass", &raw.password).unwrap());
    }

    #[actix_web::test]
    async fn test_seed_admin_skips_when_an_admin_exists() {
        let (service, _) = service();
        service
            .create(new_user("boss@x.com", "boss", Role::Admin))
            .await
            .unwrap();

        assert_eq!(service.seed_admin(&admin_seed()).await.unwrap(), None);
        assert_eq!(service.find_by_email("root@x.com").await.unwrap(), None);
    }

    #[actix_web::test]
    async fn test_seed_admin_skips_when_user_name_is_taken() {
        let (service, _) = service();
        let squatter = service
            .create(new_user("other@x.com", "root", Role::Member))
            .await
            .unwrap();

        assert_eq!(service.seed_admin(&admin_seed()).await.unwrap(), None);
        let reloaded = service.find_by_id(&squatter.id).await.unwrap().unwrap();
        assert_eq!(reloaded.role, Role::Member);
        assert_eq!(service.users_count().await.unwrap(), UserCount { count: 1 });
    }

    #[actix_web::test]
    async fn test_delete_removes_the_users_memberships() {
        let (service, store) = service();
        let member = service
            .create(new_user("m@x.com", "member", Role::Member))
            .await
            .unwrap();
        let member_id = ObjectId::parse_str(&member.id).unwrap();
        let community_id = ObjectId::new();
        MembershipRepository::insert(
            &*store,
            CommunityMembership {
                id: ObjectId::new(),
                user_id: member_id,
                community_id,
                joined_at: DateTime::now(),
            },
        )
        .await
        .unwrap();

        service.delete_user(&member.id).await.unwrap();

        assert!(service.user_communities(&member.id).await.unwrap().is_empty());
        assert!(store.find_by_community(&community_id).await.unwrap().is_empty());
    }
}
