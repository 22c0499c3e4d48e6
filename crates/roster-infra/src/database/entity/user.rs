//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use roster_core::RepoError;
use roster_core::domain::{User, UserId};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "auth_user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub stripe_customer_id: Option<String>,
    pub created_time: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain User.
///
/// Fails on a row whose `id` is not a UUID.
impl TryFrom<Model> for User {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id: UserId = model
            .id
            .parse()
            .map_err(|e| RepoError::Query(format!("malformed user id {:?}: {}", model.id, e)))?;

        Ok(User::restore(
            id,
            model.email,
            model.username,
            model.password_hash,
            model.stripe_customer_id,
            model.created_time.into(),
        ))
    }
}

/// Conversion from Domain User to SeaORM ActiveModel.
impl From<User> for ActiveModel {
    fn from(user: User) -> Self {
        Self {
            id: Set(user.id().to_string()),
            password_hash: Set(user.password_hash().to_string()),
            stripe_customer_id: Set(user.stripe_customer_id().map(str::to_string)),
            created_time: Set(user.created_time().into()),
            email: Set(user.email),
            username: Set(user.username),
        }
    }
}
