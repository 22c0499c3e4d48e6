//! Store-level error types.

use thiserror::Error;

/// Errors surfaced by user stores.
///
/// A lookup miss is [`RepoError::NotFound`], which callers can branch on
/// separately from infrastructure failures.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl RepoError {
    /// True for a lookup miss, false for every infrastructure failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinct_from_infrastructure_errors() {
        assert!(RepoError::NotFound.is_not_found());
        assert!(!RepoError::Connection("refused".into()).is_not_found());
        assert!(!RepoError::Query("syntax".into()).is_not_found());
        assert!(!RepoError::Constraint("duplicate".into()).is_not_found());
    }
}
