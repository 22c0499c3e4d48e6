use async_trait::async_trait;

use crate::domain::{User, UserId, UserProfile};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID. A miss is [`RepoError::NotFound`].
    async fn find_by_id(&self, id: ID) -> Result<T, RepoError>;

    /// Find every entity whose ID is in `ids`. Unknown IDs are skipped.
    async fn find_by_ids(&self, ids: &[ID]) -> Result<Vec<T>, RepoError>;

    /// Save an entity, inserting it or overwriting the stored row with the same ID.
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Deleting a missing entity succeeds.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;

    /// Delete every entity.
    async fn truncate(&self) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, UserId> {
    /// Find a user by email address, ignoring case.
    async fn find_by_email(&self, email: &str) -> Result<User, RepoError>;

    /// Find a user by username, ignoring case.
    async fn find_by_username(&self, username: &str) -> Result<User, RepoError>;

    /// Compute derived fields for an already-fetched batch. Never does I/O.
    fn hydrate(&self, users: Vec<User>) -> Vec<UserProfile> {
        users.iter().map(UserProfile::hydrated).collect()
    }
}
