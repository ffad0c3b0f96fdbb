//! In-process record store.
//!
//! Enforces the same uniqueness rules as the MongoDB indexes: user email,
//! user name, community name and the user/community membership pair.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use log::debug;
use mongodb::bson::{oid::ObjectId, DateTime};

use super::community_repository::{COMMUNITY_ENTITY, MEMBERSHIP_ENTITY};
use super::user_repository::USER_ENTITY;
use super::{CommunityRepository, MembershipRepository, RepositoryError, UserRepository};
use crate::models::{
    Community, CommunityChanges, CommunityMembership, User, UserFilter, UserUpdate,
};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<Vec<User>>,
    communities: RwLock<Vec<Community>>,
    memberships: RwLock<Vec<CommunityMembership>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, RepositoryError> {
    lock.read()
        .map_err(|_| RepositoryError::backend("in-memory store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, RepositoryError> {
    lock.write()
        .map_err(|_| RepositoryError::backend("in-memory store lock poisoned"))
}

fn check_user_unique(
    users: &[User],
    id: &ObjectId,
    email: &str,
    user_name: &str,
) -> Result<(), RepositoryError> {
    for other in users.iter().filter(|u| u.id != *id) {
        if other.email == email {
            return Err(RepositoryError::constraint(format!(
                "duplicate email: {}",
                email
            )));
        }
        if other.user_name == user_name {
            return Err(RepositoryError::constraint(format!(
                "duplicate user_name: {}",
                user_name
            )));
        }
    }
    Ok(())
}

fn check_community_unique(
    communities: &[Community],
    id: &ObjectId,
    name: &str,
) -> Result<(), RepositoryError> {
    if communities.iter().any(|c| c.id != *id && c.name == name) {
        return Err(RepositoryError::constraint(format!(
            "duplicate community name: {}",
            name
        )));
    }
    Ok(())
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: User) -> Result<User, RepositoryError> {
        let mut users = write(&self.users)?;
        if users.iter().any(|u| u.id == user.id) {
            return Err(RepositoryError::constraint(format!(
                "duplicate id: {}",
                user.id
            )));
        }
        check_user_unique(&users, &user.id, &user.email, &user.user_name)?;
        users.push(user.clone());
        debug!("Memory store: {} users", users.len());
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, RepositoryError> {
        Ok(read(&self.users)?.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_first(&self, filter: &UserFilter) -> Result<Option<User>, RepositoryError> {
        Ok(read(&self.users)?
            .iter()
            .find(|u| filter.matches(u))
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(read(&self.users)?.clone())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(read(&self.users)?.len() as u64)
    }

    async fn update(&self, id: &ObjectId, update: UserUpdate) -> Result<User, RepositoryError> {
        let mut users = write(&self.users)?;
        let index = users
            .iter()
            .position(|u| u.id == *id)
            .ok_or_else(|| RepositoryError::not_found(USER_ENTITY))?;

        let mut updated = users[index].clone();
        if let Some(email) = update.email {
            updated.email = email;
        }
        if let Some(user_name) = update.user_name {
            updated.user_name = user_name;
        }
        if let Some(password_hash) = update.password_hash {
            updated.password = password_hash;
        }
        if let Some(role) = update.role {
            updated.role = role;
        }
        updated.updated_at = DateTime::now();

        check_user_unique(&users, id, &updated.email, &updated.user_name)?;
        users[index] = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &ObjectId) -> Result<User, RepositoryError> {
        let mut users = write(&self.users)?;
        let index = users
            .iter()
            .position(|u| u.id == *id)
            .ok_or_else(|| RepositoryError::not_found(USER_ENTITY))?;
        Ok(users.remove(index))
    }
}

#[async_trait]
impl CommunityRepository for InMemoryStore {
    async fn insert(&self, community: Community) -> Result<Community, RepositoryError> {
        let mut communities = write(&self.communities)?;
        check_community_unique(&communities, &community.id, &community.name)?;
        communities.push(community.clone());
        Ok(community)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Community>, RepositoryError> {
        Ok(read(&self.communities)?
            .iter()
            .find(|c| c.id == *id)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Community>, RepositoryError> {
        let mut all = read(&self.communities)?.clone();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn update(
        &self,
        id: &ObjectId,
        changes: CommunityChanges,
    ) -> Result<Community, RepositoryError> {
        let mut communities = write(&self.communities)?;
        let index = communities
            .iter()
            .position(|c| c.id == *id)
            .ok_or_else(|| RepositoryError::not_found(COMMUNITY_ENTITY))?;

        let mut updated = communities[index].clone();
        if let Some(name) = changes.name {
            updated.name = name;
        }
        if let Some(description) = changes.description {
            updated.description = Some(description);
        }
        updated.updated_at = DateTime::now();

        check_community_unique(&communities, id, &updated.name)?;
        communities[index] = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &ObjectId) -> Result<Community, RepositoryError> {
        let mut communities = write(&self.communities)?;
        let index = communities
            .iter()
            .position(|c| c.id == *id)
            .ok_or_else(|| RepositoryError::not_found(COMMUNITY_ENTITY))?;
        Ok(communities.remove(index))
    }
}

#[async_trait]
impl MembershipRepository for InMemoryStore {
    async fn insert(
        &self,
        membership: CommunityMembership,
    ) -> Result<CommunityMembership, RepositoryError> {
        let mut memberships = write(&self.memberships)?;
        if memberships.iter().any(|m| {
            m.user_id == membership.user_id && m.community_id == membership.community_id
        }) {
            return Err(RepositoryError::constraint("duplicate membership"));
        }
        memberships.push(membership.clone());
        Ok(membership)
    }

    async fn find_by_user(
        &self,
        user_id: &ObjectId,
    ) -> Result<Vec<CommunityMembership>, RepositoryError> {
        Ok(read(&self.memberships)?
            .iter()
            .filter(|m| m.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn find_by_community(
        &self,
        community_id: &ObjectId,
    ) -> Result<Vec<CommunityMembership>, RepositoryError> {
        Ok(read(&self.memberships)?
            .iter()
            .filter(|m| m.community_id == *community_id)
            .cloned()
            .collect())
    }

    async fn delete(
        &self,
        user_id: &ObjectId,
        community_id: &ObjectId,
    ) -> Result<CommunityMembership, RepositoryError> {
        let mut memberships = write(&self.memberships)?;
        let index = memberships
            .iter()
            .position(|m| m.user_id == *user_id && m.community_id == *community_id)
            .ok_or_else(|| RepositoryError::not_found(MEMBERSHIP_ENTITY))?;
        Ok(memberships.remove(index))
    }

    async fn delete_for_community(&self, community_id: &ObjectId) -> Result<u64, RepositoryError> {
        let mut memberships = write(&self.memberships)?;
        let before = memberships.len();
        memberships.retain(|m| m.community_id != *community_id);
        Ok((before - memberships.len()) as u64)
    }

    async fn delete_for_user(&self, user_id: &ObjectId) -> Result<u64, RepositoryError> {
        let mut memberships = write(&self.memberships)?;
        let before = memberships.len();
        memberships.retain(|m| m.user_id != *user_id);
        Ok((before - memberships.len()) as u64)
    }
}
