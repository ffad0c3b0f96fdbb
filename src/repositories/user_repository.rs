//! User persistence: the store contract and its MongoDB adapter.

use async_trait::async_trait;
use futures::TryStreamExt;
use log::{debug, info};
use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};

use super::RepositoryError;
use crate::constants::COLLECTION_USERS;
use crate::models::{User, UserFilter, UserUpdate};

pub(crate) const USER_ENTITY: &str = "User";

/// Store contract for user records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user. Fails with `ConstraintViolation` on a duplicate
    /// email or user name.
    async fn insert(&self, user: User) -> Result<User, RepositoryError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, RepositoryError>;

    /// First user matching the filter, if any.
    async fn find_first(&self, filter: &UserFilter) -> Result<Option<User>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;

    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Apply `update` and return the record as stored afterwards.
    async fn update(&self, id: &ObjectId, update: UserUpdate) -> Result<User, RepositoryError>;

    /// Remove the record and return its last state.
    async fn delete(&self, id: &ObjectId) -> Result<User, RepositoryError>;
}

/// MongoDB-backed [`UserRepository`].
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION_USERS),
        }
    }

    /// Create unique indexes on `email` and `user_name`.
    ///
    /// Call once during startup; uniqueness is enforced by these indexes.
    pub async fn create_indexes(&self) -> Result<(), RepositoryError> {
        info!("Creating database indexes for users collection...");

        let unique = || IndexOptions::builder().unique(true).build();
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique())
                .build(),
            IndexModel::builder()
                .keys(doc! { "user_name": 1 })
                .options(unique())
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        Ok(())
    }
}

fn filter_document(filter: &UserFilter) -> Document {
    match filter {
        UserFilter::Email(email) => doc! { "email": email },
        UserFilter::LoginDetails(field) => doc! {
            "$or": [
                { "email": field },
                { "user_name": field },
            ]
        },
        UserFilter::Role(role) => doc! { "role": role.to_string() },
    }
}

fn update_document(update: UserUpdate) -> Document {
    let mut set = doc! { "updated_at": DateTime::now() };
    if let Some(email) = update.email {
        set.insert("email", email);
    }
    if let Some(user_name) = update.user_name {
        set.insert("user_name", user_name);
    }
    if let Some(password_hash) = update.password_hash {
        set.insert("password", password_hash);
    }
    if let Some(role) = update.role {
        set.insert("role", role.to_string());
    }
    doc! { "$set": set }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, user: User) -> Result<User, RepositoryError> {
        self.collection.insert_one(&user).await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, RepositoryError> {
        debug!("Repository: Finding user by ID: {}", id);
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_first(&self, filter: &UserFilter) -> Result<Option<User>, RepositoryError> {
        Ok(self.collection.find_one(filter_document(filter)).await?)
    }

    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "created_at": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn update(&self, id: &ObjectId, update: UserUpdate) -> Result<User, RepositoryError> {
        debug!("Repository: Updating user: {}", id);
        self.collection
            .find_one_and_update(doc! { "_id": id }, update_document(update))
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| RepositoryError::not_found(USER_ENTITY))
    }

    async fn delete(&self, id: &ObjectId) -> Result<User, RepositoryError> {
        debug!("Repository: Deleting user: {}", id);
        self.collection
            .find_one_and_delete(doc! { "_id": id })
            .await?
            .ok_or_else(|| RepositoryError::not_found(USER_ENTITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_login_details_filter_matches_either_field() {
        let filter = filter_document(&UserFilter::LoginDetails("abc".to_string()));
        assert_eq!(
            filter,
            doc! { "$or": [ { "email": "abc" }, { "user_name": "abc" } ] }
        );
    }

    #[test]
    fn test_update_document_only_sets_present_fields() {
        let update = update_document(UserUpdate::role(Role::Admin));
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("role").unwrap(), "admin");
        assert!(set.contains_key("updated_at"));
        assert!(!set.contains_key("email"));
        assert!(!set.contains_key("password"));
    }
}
