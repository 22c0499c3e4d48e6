//! In-memory user store - used when no database is configured.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::RwLock;

use roster_core::domain::{User, UserId};
use roster_core::error::RepoError;
use roster_core::ports::{BaseRepository, Stores, UserRepository};

/// In-memory user store keyed by id, with the same case-insensitive
/// uniqueness rules the `auth_user` table enforces.
///
/// Note: Data is lost on process restart.
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
    stores: Option<Weak<Stores>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            stores: None,
        }
    }

    /// Attach the collection this store belongs to.
    pub fn with_stores(mut self, stores: Weak<Stores>) -> Self {
        self.stores = Some(stores);
        self
    }

    /// Sibling stores, if this store was attached to a live collection.
    pub fn stores(&self) -> Option<Arc<Stores>> {
        self.stores.as_ref().and_then(Weak::upgrade)
    }

    async fn find_one_ignore_case<F>(
        &self,
        field: &str,
        value: &str,
        get: F,
    ) -> Result<User, RepoError>
    where
        F: Fn(&User) -> &str,
    {
        let wanted = fold_case(value);
        let users = self.users.read().await;
        let mut matches = users.values().filter(|u| fold_case(get(*u)) == wanted);

        match (matches.next(), matches.next()) {
            (None, _) => Err(RepoError::NotFound),
            (Some(user), None) => Ok(user.clone()),
            (Some(_), Some(_)) => Err(RepoError::Constraint(format!(
                "multiple users share the same {}",
                field
            ))),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Uppercase one char at a time, keeping chars whose uppercase form is
/// longer than one char (`ß`), the way Postgres `UPPER` does.
fn fold_case(s: &str) -> String {
    s.chars()
        .map(|c| {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) => u,
                _ => c,
            }
        })
        .collect()
}

fn same_ignore_case(a: &str, b: &str) -> bool {
    fold_case(a) == fold_case(b)
}

#[async_trait]
impl BaseRepository<User, UserId> for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<User, RepoError> {
        let users = self.users.read().await;
        users.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.users.read().await;
        let mut seen = HashSet::with_capacity(ids.len());
        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| users.get(id).cloned())
            .collect())
    }

    async fn save(&self, entity: User) -> Result<User, RepoError> {
        // Hold the write lock across the uniqueness check
        let mut users = self.users.write().await;

        let others = users.values().filter(|u| u.id() != entity.id());
        for other in others {
            if same_ignore_case(&other.email, &entity.email) {
                return Err(RepoError::Constraint("email already taken".to_string()));
            }
            if same_ignore_case(&other.username, &entity.username) {
                return Err(RepoError::Constraint("username already taken".to_string()));
            }
        }

        users.insert(entity.id(), entity.clone());
        tracing::info!(user_id = %entity.id(), "User saved");
        Ok(entity)
    }

    async fn delete(&self, id: UserId) -> Result<(), RepoError> {
        let mut users = self.users.write().await;
        let removed = users.remove(&id).is_some();
        tracing::info!(user_id = %id, removed, "User deleted");
        Ok(())
    }

    async fn truncate(&self) -> Result<(), RepoError> {
        let mut users = self.users.write().await;
        let rows = users.len();
        users.clear();
        tracing::warn!(rows, "User table truncated");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<User, RepoError> {
        self.find_one_ignore_case("email", email, |u| &u.email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<User, RepoError> {
        self.find_one_ignore_case("username", username, |u| &u.username).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user(email: &str, username: &str) -> User {
        User::restore(
            UserId::generate(),
            email.to_string(),
            username.to_string(),
            "$2b$04$placeholder".to_string(),
            None,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_save_then_find_by_id() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.save(user("foo@bar.com", "foo")).await.unwrap();

        let found = repo.find_by_id(saved.id()).await.unwrap();
        assert_eq!(found, saved);
    }

    #[tokio::test]
    async fn test_save_overwrites_every_field() {
        let repo = InMemoryUserRepository::new();
        let mut first = repo.save(user("foo@bar.com", "foo")).await.unwrap();

        first.email = "new@bar.com".to_string();
        first.username = "renamed".to_string();
        first.set_stripe_customer_id(Some("cus_1".to_string()));
        repo.save(first.clone()).await.unwrap();

        let found = repo.find_by_id(first.id()).await.unwrap();
        assert_eq!(found, first);
        assert_eq!(found.stripe_customer_id(), Some("cus_1"));
    }

    #[tokio::test]
    async fn test_lookups_ignore_case() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.save(user("foo@bar.com", "Foo")).await.unwrap();

        assert_eq!(repo.find_by_email("Foo@Bar.com").await.unwrap().id(), saved.id());
        assert_eq!(repo.find_by_username("FOO").await.unwrap().id(), saved.id());
        assert!(repo.find_by_email("nobody@bar.com").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_save_rejects_case_insensitive_duplicates() {
        let repo = InMemoryUserRepository::new();
        repo.save(user("foo@bar.com", "foo")).await.unwrap();

        let err = repo.save(user("FOO@bar.com", "other")).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));

        let err = repo.save(user("other@bar.com", "FOO")).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.save(user("foo@bar.com", "foo")).await.unwrap();

        repo.delete(saved.id()).await.unwrap();
        repo.delete(saved.id()).await.unwrap();
        repo.delete(UserId::generate()).await.unwrap();

        assert!(repo.find_by_id(saved.id()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_unknown() {
        let repo = InMemoryUserRepository::new();
        let a = repo.save(user("a@x.com", "a")).await.unwrap();
        let b = repo.save(user("b@x.com", "b")).await.unwrap();

        let found = repo
            .find_by_ids(&[a.id(), UserId::generate(), b.id()])
            .await
            .unwrap();
        assert_eq!(found, vec![a, b]);
        assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_ids_returns_each_user_once() {
        let repo = InMemoryUserRepository::new();
        let a = repo.save(user("a@x.com", "a")).await.unwrap();

        let found = repo.find_by_ids(&[a.id(), a.id(), a.id()]).await.unwrap();
        assert_eq!(found, vec![a]);
    }

    #[tokio::test]
    async fn test_case_folding_is_per_char() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.save(user("elan@x.com", "Straße")).await.unwrap();

        assert_eq!(repo.find_by_username("STRAßE").await.unwrap().id(), saved.id());
        assert!(repo.find_by_username("STRASSE").await.unwrap_err().is_not_found());
        repo.save(user("ss@x.com", "strasse")).await.unwrap();

        let accented = repo.save(user("e@x.com", "élan")).await.unwrap();
        assert_eq!(repo.find_by_username("ÉLAN").await.unwrap().id(), accented.id());
    }

    #[test]
    fn test_fold_case() {
        assert_eq!(fold_case("Foo@Bar.com"), "FOO@BAR.COM");
        assert_eq!(fold_case("ß"), "ß");
        assert_eq!(fold_case("é"), "É");
    }

    #[tokio::test]
    async fn test_truncate_removes_everything() {
        let repo = InMemoryUserRepository::new();
        let a = repo.save(user("a@x.com", "a")).await.unwrap();
        repo.save(user("b@x.com", "b")).await.unwrap();

        repo.truncate().await.unwrap();

        assert!(repo.find_by_id(a.id()).await.unwrap_err().is_not_found());
        assert!(repo.find_by_email("b@x.com").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_stores_handle_reaches_siblings() {
        let mut concrete = None;
        let stores = Stores::new_cyclic(|weak| {
            let repo = Arc::new(InMemoryUserRepository::new().with_stores(weak));
            concrete = Some(repo.clone());
            repo as Arc<dyn UserRepository>
        });
        let concrete = concrete.unwrap();

        let siblings = concrete.stores().unwrap();
        assert!(Arc::ptr_eq(&siblings, &stores));

        drop(siblings);
        drop(stores);
        assert!(concrete.stores().is_none());
        assert!(InMemoryUserRepository::new().stores().is_none());
    }

    #[tokio::test]
    async fn test_hydrate_flags_stripe_customers() {
        let repo = InMemoryUserRepository::new();
        let mut paying = user("a@x.com", "a");
        paying.set_stripe_customer_id(Some("cus_1".to_string()));
        let free = user("b@x.com", "b");

        let profiles = repo.hydrate(vec![paying.clone(), free.clone()]);

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].id, paying.id());
        assert_eq!(profiles[0].has_stripe_customer_id, Some(true));
        assert_eq!(profiles[1].has_stripe_customer_id, Some(false));
        assert!(repo.hydrate(Vec::new()).is_empty());
    }
}
