//! # Roster Core
//!
//! The domain layer of the Roster user store.
//! This crate contains the user entity, credential rules, and the ports
//! that infrastructure implements. It has no infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::RepoError;
