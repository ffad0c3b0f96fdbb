//! Community and membership persistence.

use async_trait::async_trait;
use futures::TryStreamExt;
use log::{debug, info};
use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};

use super::RepositoryError;
use crate::constants::{COLLECTION_COMMUNITIES, COLLECTION_COMMUNITY_MEMBERS};
use crate::models::{Community, CommunityChanges, CommunityMembership};

pub(crate) const COMMUNITY_ENTITY: &str = "Community";
pub(crate) const MEMBERSHIP_ENTITY: &str = "Membership";

/// Store contract for community records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunityRepository: Send + Sync {
    /// Persist a new community. Fails with `ConstraintViolation` on a duplicate name.
    async fn insert(&self, community: Community) -> Result<Community, RepositoryError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Community>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Community>, RepositoryError>;

    async fn update(
        &self,
        id: &ObjectId,
        changes: CommunityChanges,
    ) -> Result<Community, RepositoryError>;

    async fn delete(&self, id: &ObjectId) -> Result<Community, RepositoryError>;
}

/// Store contract for user/community associations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Fails with `ConstraintViolation` if the pair already exists.
    async fn insert(
        &self,
        membership: CommunityMembership,
    ) -> Result<CommunityMembership, RepositoryError>;

    async fn find_by_user(
        &self,
        user_id: &ObjectId,
    ) -> Result<Vec<CommunityMembership>, RepositoryError>;

    async fn find_by_community(
        &self,
        community_id: &ObjectId,
    ) -> Result<Vec<CommunityMembership>, RepositoryError>;

    /// Remove one membership and return it.
    async fn delete(
        &self,
        user_id: &ObjectId,
        community_id: &ObjectId,
    ) -> Result<CommunityMembership, RepositoryError>;

    /// Remove every membership of a community, returning how many were removed.
    async fn delete_for_community(&self, community_id: &ObjectId) -> Result<u64, RepositoryError>;

    /// Remove every membership held by a user, returning how many were removed.
    async fn delete_for_user(&self, user_id: &ObjectId) -> Result<u64, RepositoryError>;
}

/// MongoDB-backed [`CommunityRepository`].
pub struct MongoCommunityRepository {
    collection: Collection<Community>,
}

impl MongoCommunityRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION_COMMUNITIES),
        }
    }

    pub async fn create_indexes(&self) -> Result<(), RepositoryError> {
        info!("Creating database indexes for communities collection...");
        let index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

fn community_update_document(changes: CommunityChanges) -> Document {
    let mut set = doc! { "updated_at": DateTime::now() };
    if let Some(name) = changes.name {
        set.insert("name", name);
    }
    if let Some(description) = changes.description {
        set.insert("description", description);
    }
    doc! { "$set": set }
}

#[async_trait]
impl CommunityRepository for MongoCommunityRepository {
    async fn insert(&self, community: Community) -> Result<Community, RepositoryError> {
        self.collection.insert_one(&community).await?;
        Ok(community)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Community>, RepositoryError> {
        debug!("Repository: Finding community by ID: {}", id);
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_all(&self) -> Result<Vec<Community>, RepositoryError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update(
        &self,
        id: &ObjectId,
        changes: CommunityChanges,
    ) -> Result<Community, RepositoryError> {
        self.collection
            .find_one_and_update(doc! { "_id": id }, community_update_document(changes))
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| RepositoryError::not_found(COMMUNITY_ENTITY))
    }

    async fn delete(&self, id: &ObjectId) -> Result<Community, RepositoryError> {
        self.collection
            .find_one_and_delete(doc! { "_id": id })
            .await?
            .ok_or_else(|| RepositoryError::not_found(COMMUNITY_ENTITY))
    }
}

/// MongoDB-backed [`MembershipRepository`].
pub struct MongoMembershipRepository {
    collection: Collection<CommunityMembership>,
}

impl MongoMembershipRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION_COMMUNITY_MEMBERS),
        }
    }

    /// Unique compound index on the user/community pair, plus a lookup index
    /// on `community_id` for member listings.
    pub async fn create_indexes(&self) -> Result<(), RepositoryError> {
        info!("Creating database indexes for community_members collection...");
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "user_id": 1, "community_id": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "community_id": 1 })
                .build(),
        ];
        self.collection.create_indexes(indexes).await?;
        Ok(())
    }

    async fn find_where(
        &self,
        filter: Document,
    ) -> Result<Vec<CommunityMembership>, RepositoryError> {
        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "joined_at": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl MembershipRepository for MongoMembershipRepository {
    async fn insert(
        &self,
        membership: CommunityMembership,
    ) -> Result<CommunityMembership, RepositoryError> {
        self.collection.insert_one(&membership).await?;
        Ok(membership)
    }

    async fn find_by_user(
        &self,
        user_id: &ObjectId,
    ) -> Result<Vec<CommunityMembership>, RepositoryError> {
        debug!("Repository: Finding memberships for user: {}", user_id);
        self.find_where(doc! { "user_id": user_id }).await
    }

    async fn find_by_community(
        &self,
        community_id: &ObjectId,
    ) -> Result<Vec<CommunityMembership>, RepositoryError> {
        self.find_where(doc! { "community_id": community_id }).await
    }

    async fn delete(
        &self,
        user_id: &ObjectId,
        community_id: &ObjectId,
    ) -> Result<CommunityMembership, RepositoryError> {
        self.collection
            .find_one_and_delete(doc! { "user_id": user_id, "community_id": community_id })
            .await?
            .ok_or_else(|| RepositoryError::not_found(MEMBERSHIP_ENTITY))
    }

    async fn delete_for_community(&self, community_id: &ObjectId) -> Result<u64, RepositoryError> {
        let result = self
            .collection
            .delete_many(doc! { "community_id": community_id })
            .await?;
        Ok(result.deleted_count)
    }

    async fn delete_for_user(&self, user_id: &ObjectId) -> Result<u64, RepositoryError> {
        let result = self
            .collection
            .delete_many(doc! { "user_id": user_id })
            .await?;
        Ok(result.deleted_count)
    }
}
