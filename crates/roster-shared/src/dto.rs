//! Data Transfer Objects - request types for the API.

use serde::{Deserialize, Serialize};

/// Request to create a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Request to replace a user's password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// Query string for batch lookups: `?ids=<id>,<id>,...`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserIdsQuery {
    #[serde(default)]
    pub ids: String,
}

impl UserIdsQuery {
    /// The individual ids, with blanks dropped.
    pub fn split(&self) -> impl Iterator<Item = &str> {
        self.ids.split(',').map(str::trim).filter(|s| !s.is_empty())
    }
}
