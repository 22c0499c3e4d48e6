//! # Roster Infrastructure
//!
//! Concrete implementations of the ports defined in `roster-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory store only
//! - `postgres` - PostgreSQL user store via SeaORM
//! - `auth` - bcrypt password hashing

pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

pub use database::InMemoryUserRepository;

#[cfg(feature = "postgres")]
pub use database::PostgresUserRepository;

#[cfg(feature = "auth")]
pub use auth::BcryptPasswordService;
