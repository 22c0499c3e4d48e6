//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod repository;
mod stores;

pub use auth::{AuthError, PasswordService};
pub use repository::{BaseRepository, UserRepository};
pub use stores::Stores;
