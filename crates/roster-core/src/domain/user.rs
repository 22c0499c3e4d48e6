use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ports::{AuthError, PasswordService};

/// Primary key of a user, persisted in its hyphenated string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh, globally unique identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

/// User entity - one account.
///
/// Serializing a `User` only exposes `id`, `username` and `created_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: UserId,
    #[serde(skip_serializing)]
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    password_hash: String,
    #[serde(skip_serializing)]
    stripe_customer_id: Option<String>,
    created_time: DateTime<Utc>,
}

impl User {
    /// Create a new user with a generated ID, the current time, and a hashed password.
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: &str,
        hasher: &dyn PasswordService,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            id: UserId::generate(),
            email: email.into(),
            username: username.into(),
            password_hash: hasher.hash(password)?,
            stripe_customer_id: None,
            // Postgres keeps microseconds; match it so stored rows compare equal.
            created_time: Utc::now().trunc_subsecs(6),
        })
    }

    /// Rebuild a user from a stored record.
    pub fn restore(
        id: UserId,
        email: String,
        username: String,
        password_hash: String,
        stripe_customer_id: Option<String>,
        created_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            username,
            password_hash,
            stripe_customer_id: stripe_customer_id.filter(|s| !s.is_empty()),
            created_time,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn stripe_customer_id(&self) -> Option<&str> {
        self.stripe_customer_id.as_deref()
    }

    pub fn created_time(&self) -> DateTime<Utc> {
        self.created_time
    }

    /// Replace the password hash. Nothing is persisted until the user is saved.
    pub fn set_password(
        &mut self,
        password: &str,
        hasher: &dyn PasswordService,
    ) -> Result<(), AuthError> {
        self.password_hash = hasher.hash(password)?;
        Ok(())
    }

    pub fn check_password(
        &self,
        password: &str,
        hasher: &dyn PasswordService,
    ) -> Result<bool, AuthError> {
        hasher.verify(password, &self.password_hash)
    }

    /// Set or clear the billing reference. An empty string clears it.
    pub fn set_stripe_customer_id(&mut self, customer_id: Option<String>) {
        self.stripe_customer_id = customer_id.filter(|s| !s.is_empty());
    }

    pub fn has_stripe_customer_id(&self) -> bool {
        self.stripe_customer_id.is_some()
    }
}

/// Outward-facing view of a user.
///
/// `has_stripe_customer_id` stays `None` until the user went through
/// hydration and is omitted from JSON while unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub created_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_stripe_customer_id: Option<bool>,
}

impl UserProfile {
    /// Build a profile with every derived field computed.
    pub fn hydrated(user: &User) -> Self {
        Self {
            has_stripe_customer_id: Some(user.has_stripe_customer_id()),
            ..Self::from(user)
        }
    }
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            created_time: user.created_time,
            has_stripe_customer_id: None,
        }
    }
}
