//! PostgreSQL user store.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, OnConflict};
use sea_orm::{
    ColumnTrait, DbConn, DbErr, EntityTrait, IdenStatic, QueryFilter, QuerySelect, SqlErr,
};

use roster_core::domain::{User, UserId};
use roster_core::error::RepoError;
use roster_core::ports::{BaseRepository, Stores, UserRepository};

use super::entity::user::{self, Entity as UserEntity};

/// PostgreSQL user repository.
///
/// Every operation is a single statement against the `auth_user` table.
pub struct PostgresUserRepository {
    pub(crate) db: DbConn,
    stores: Option<Weak<Stores>>,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db, stores: None }
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

    /// Fetch the single user whose `column` equals `value`, ignoring case.
    async fn find_one_ignore_case(
        &self,
        column: user::Column,
        value: &str,
    ) -> Result<User, RepoError> {
        // Two rows are enough to tell "unique" from "duplicated".
        let mut rows = UserEntity::find()
            .filter(Expr::expr(Func::upper(Expr::col(column))).eq(Func::upper(value)))
            .limit(2)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        if rows.len() > 1 {
            tracing::error!(column = ?column, "Case-insensitive lookup matched several users");
            return Err(RepoError::Constraint(format!(
                "multiple users share the same {}",
                column.as_str()
            )));
        }

        rows.pop().ok_or(RepoError::NotFound)?.try_into()
    }
}

/// Classify a SeaORM error into the store's error taxonomy.
fn map_db_err(err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg))
        | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
            return RepoError::Constraint(msg);
        }
        _ => {}
    }

    match err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(err.to_string()),
        _ => RepoError::Query(err.to_string()),
    }
}

fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.len() > first.len_utf8() => format!("{}***", first),
                _ => "***".to_string(),
            };
            format!("{}{}", masked_local, domain)
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl BaseRepository<User, UserId> for PostgresUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<User, RepoError> {
        let result = UserEntity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        result.ok_or(RepoError::NotFound)?.try_into()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, RepoError> {
        // An empty IN () is invalid SQL.
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().map(UserId::to_string)))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        result.into_iter().map(User::try_from).collect()
    }

    async fn save(&self, entity: User) -> Result<User, RepoError> {
        let active_model: user::ActiveModel = entity.clone().into();

        UserEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(user::Column::Id)
                    .update_columns([
                        user::Column::Email,
                        user::Column::Username,
                        user::Column::PasswordHash,
                        user::Column::StripeCustomerId,
                        user::Column::CreatedTime,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::info!(user_id = %entity.id(), "User saved");
        Ok(entity)
    }

    async fn delete(&self, id: UserId) -> Result<(), RepoError> {
        let result = UserEntity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::info!(user_id = %id, rows = result.rows_affected, "User deleted");
        Ok(())
    }

    async fn truncate(&self) -> Result<(), RepoError> {
        let result = UserEntity::delete_many()
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::warn!(rows = result.rows_affected, "User table truncated");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<User, RepoError> {
        // Mask email for logging to avoid PII in logs
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");
        self.find_one_ignore_case(user::Column::Email, email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<User, RepoError> {
        tracing::debug!(username, "Finding user by username");
        self.find_one_ignore_case(user::Column::Username, username).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("foo@bar.com"), "f***@bar.com");
        assert_eq!(mask_email("f@bar.com"), "***@bar.com");
        assert_eq!(mask_email("no-at-sign"), "***");
    }

    #[test]
    fn test_map_db_err_classifies_connection_failures() {
        let err = map_db_err(DbErr::Conn(sea_orm::RuntimeErr::Internal("refused".into())));
        assert!(matches!(err, RepoError::Connection(_)));

        let err = map_db_err(DbErr::Query(sea_orm::RuntimeErr::Internal("syntax".into())));
        assert!(matches!(err, RepoError::Query(_)));
    }
}
