//! Community CRUD and membership management.

use std::sync::Arc;

use log::{debug, info};
use mongodb::bson::{oid::ObjectId, DateTime};

use crate::constants::{
    ERR_ALREADY_MEMBER, ERR_COMMUNITY_NOT_FOUND, ERR_DUPLICATE_COMMUNITY,
    ERR_INVALID_COMMUNITY_ID, ERR_INVALID_USER_ID, ERR_NOT_A_MEMBER, ERR_USER_NOT_FOUND,
};
use crate::errors::ApiError;
use crate::models::{Community, CommunityChanges, CommunityMembership, NewCommunity};
use crate::repositories::{
    CommunityRepository, MembershipRepository, RepositoryError, UserRepository,
};
use crate::services::{authorize, Action, Actor};
use crate::utils::parse_object_id;

pub struct CommunityService {
    users: Arc<dyn UserRepository>,
    communities: Arc<dyn CommunityRepository>,
    memberships: Arc<dyn MembershipRepository>,
}

impl CommunityService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        communities: Arc<dyn CommunityRepository>,
        memberships: Arc<dyn MembershipRepository>,
    ) -> Self {
        Self {
            users,
            communities,
            memberships,
        }
    }

    pub async fn create(&self, new_community: NewCommunity) -> Result<Community, ApiError> {
        info!("Creating community {}", new_community.name);
        let now = DateTime::now();
        let community = Community {
            id: ObjectId::new(),
            name: new_community.name,
            description: new_community.description,
            created_at: now,
            updated_at: now,
        };

        self.communities
            .insert(community)
            .await
            .map_err(|err| match err {
                RepositoryError::ConstraintViolation { .. } => {
                    ApiError::Conflict(ERR_DUPLICATE_COMMUNITY.to_string())
                }
                other => other.into(),
            })
    }

    pub async fn find_all(&self) -> Result<Vec<Community>, ApiError> {
        Ok(self.communities.find_all().await?)
    }

    /// Unknown and malformed ids both yield `None`.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Community>, ApiError> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        Ok(self.communities.find_by_id(&object_id).await?)
    }

    pub async fn update<A: Actor + ?Sized>(
        &self,
        actor: &A,
        id: &str,
        changes: CommunityChanges,
    ) -> Result<Community, ApiError> {
        authorize(actor, Action::ManageCommunity)?;
        let object_id = parse_object_id(id, ERR_INVALID_COMMUNITY_ID)?;
        if changes.is_empty() {
            debug!("No field changes for community {}", id);
        }
        Ok(self.communities.update(&object_id, changes).await?)
    }

    /// Delete a community and its memberships, returning the community's last state.
    pub async fn delete<A: Actor + ?Sized>(
        &self,
        actor: &A,
        id: &str,
    ) -> Result<Community, ApiError> {
        authorize(actor, Action::ManageCommunity)?;
        let object_id = parse_object_id(id, ERR_INVALID_COMMUNITY_ID)?;

        let deleted = self.communities.delete(&object_id).await?;
        let removed = self.memberships.delete_for_community(&object_id).await?;
        info!(
            "Actor {} deleted community {} ({} memberships removed)",
            actor.actor_id(),
            id,
            removed
        );
        Ok(deleted)
    }

    pub async fn members(&self, id: &str) -> Result<Vec<CommunityMembership>, ApiError> {
        let object_id = parse_object_id(id, ERR_INVALID_COMMUNITY_ID)?;
        Ok(self.memberships.find_by_community(&object_id).await?)
    }

    pub async fn join(
        &self,
        user_id: &str,
        community_id: &str,
    ) -> Result<CommunityMembership, ApiError> {
        let user_oid = parse_object_id(user_id, ERR_INVALID_USER_ID)?;
        let community_oid = parse_object_id(community_id, ERR_INVALID_COMMUNITY_ID)?;

        if self.users.find_by_id(&user_oid).await?.is_none() {
            return Err(ApiError::NotFound(ERR_USER_NOT_FOUND.to_string()));
        }
        if self.communities.find_by_id(&community_oid).await?.is_none() {
            return Err(ApiError::NotFound(ERR_COMMUNITY_NOT_FOUND.to_string()));
        }

        let membership = CommunityMembership {
            id: ObjectId::new(),
            user_id: user_oid,
            community_id: community_oid,
            joined_at: DateTime::now(),
        };
        let joined = self
            .memberships
            .insert(membership)
            .await
            .map_err(|err| match err {
                RepositoryError::ConstraintViolation { .. } => {
                    ApiError::Conflict(ERR_ALREADY_MEMBER.to_string())
                }
                other => other.into(),
            })?;

        info!("User {} joined community {}", user_id, community_id);
        Ok(joined)
    }

    pub async fn leave(
        &self,
        user_id: &str,
        community_id: &str,
    ) -> Result<CommunityMembership, ApiError> {
        let user_oid = parse_object_id(user_id, ERR_INVALID_USER_ID)?;
        let community_oid = parse_object_id(community_id, ERR_INVALID_COMMUNITY_ID)?;

        let left = self
            .memberships
            .delete(&user_oid, &community_oid)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound { .. } => {
                    ApiError::NotFound(ERR_NOT_A_MEMBER.to_string())
                }
                other => other.into(),
            })?;

        info!("User {} left community {}", user_id, community_id);
        Ok(left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Claims, Role, User};
    use crate::repositories::{
        InMemoryStore, MockCommunityRepository, MockMembershipRepository, MockUserRepository,
    };

    fn service() -> (CommunityService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let service = CommunityService::new(store.clone(), store.clone(), store.clone());
        (service, store)
    }

    async fn stored_user(store: &InMemoryStore, user_name: &str) -> String {
        let user = User {
            id: ObjectId::new(),
            email: format!("{user_name}@x.com"),
            user_name: user_name.to_string(),
            password: "hash".to_string(),
            role: Role::Member,
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        };
        UserRepository::insert(store, user).await.unwrap().id.to_hex()
    }

    fn actor(role: Role) -> Claims {
        Claims {
            sub: ObjectId::new().to_hex(),
            email: "someone@x.com".to_string(),
            role,
            exp: 0,
            iat: 0,
        }
    }

    fn zoolea() -> NewCommunity {
        NewCommunity {
            name: "zoolea".to_string(),
            description: Some("this is zoolea".to_string()),
        }
    }

    #[actix_web::test]
    async fn test_duplicate_name_is_conflict() {
        let (service, _) = service();
        service.create(zoolea()).await.unwrap();
        assert_eq!(
            service.create(zoolea()).await,
            Err(ApiError::Conflict(ERR_DUPLICATE_COMMUNITY.to_string()))
        );
    }

    #[actix_web::test]
    async fn test_join_twice_conflicts_and_leave_requires_membership() {
        let (service, store) = service();
        let community = service.create(zoolea()).await.unwrap();
        let community_id = community.id.to_hex();
        let user_id = stored_user(&store, "member").await;

        service.join(&user_id, &community_id).await.unwrap();
        assert_eq!(
            service.join(&user_id, &community_id).await,
            Err(ApiError::Conflict(ERR_ALREADY_MEMBER.to_string()))
        );
        assert_eq!(service.members(&community_id).await.unwrap().len(), 1);

        service.leave(&user_id, &community_id).await.unwrap();
        assert_eq!(
            service.leave(&user_id, &community_id).await,
            Err(ApiError::NotFound(ERR_NOT_A_MEMBER.to_string()))
        );
    }

    #[actix_web::test]
    async fn test_join_unknown_community_is_not_found() {
        let (service, store) = service();
        let user_id = stored_user(&store, "member").await;
        let result = service.join(&user_id, &ObjectId::new().to_hex()).await;
        assert_eq!(
            result,
            Err(ApiError::NotFound(ERR_COMMUNITY_NOT_FOUND.to_string()))
        );
    }

    #[actix_web::test]
    async fn test_unknown_user_cannot_join() {
        let (service, _) = service();
        let community = service.create(zoolea()).await.unwrap();
        let community_id = community.id.to_hex();

        let result = service
            .join(&ObjectId::new().to_hex(), &community_id)
            .await;
        assert_eq!(
            result,
            Err(ApiError::NotFound(ERR_USER_NOT_FOUND.to_string()))
        );
        assert!(service.members(&community_id).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_admin_delete_removes_memberships() {
        let (service, store) = service();
        let community = service.create(zoolea()).await.unwrap();
        let community_id = community.id.to_hex();
        let user_id = stored_user(&store, "member").await;
        service.join(&user_id, &community_id).await.unwrap();

        let deleted = service
            .delete(&actor(Role::Admin), &community_id)
            .await
            .unwrap();
        assert_eq!(deleted, community);
        assert!(service.members(&community_id).await.unwrap().is_empty());
        assert_eq!(service.find_by_id(&community_id).await.unwrap(), None);
    }

    #[actix_web::test]
    async fn test_member_cannot_manage_communities() {
        let mut communities = MockCommunityRepository::new();
        communities.expect_update().never();
        communities.expect_delete().never();
        let mut memberships = MockMembershipRepository::new();
        memberships.expect_delete_for_community().never();
        let service = CommunityService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(communities),
            Arc::new(memberships),
        );

        let member = actor(Role::Member);
        let id = ObjectId::new().to_hex();
        assert!(matches!(
            service
                .update(&member, &id, CommunityChanges::default())
                .await,
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            service.delete(&member, &id).await,
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[actix_web::test]
    async fn test_admin_update_missing_community_is_not_found() {
        let (service, _) = service();
        let result = service
            .update(
                &actor(Role::Admin),
                &ObjectId::new().to_hex(),
                CommunityChanges {
                    name: Some("renamed".to_string()),
                    description: None,
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
