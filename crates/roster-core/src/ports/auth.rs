//! Credential ports.

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password with a fresh salt.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a stored hash.
    ///
    /// Any mismatch is `Ok(false)`, including a stored hash that cannot be parsed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;

    /// Whether a stored hash was produced with different parameters than the
    /// service currently uses and should be replaced on next login.
    fn needs_rehash(&self, hash: &str) -> bool;
}

/// Credential errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Password exceeds {max} bytes")]
    PasswordTooLong { max: usize },

    #[error("Hashing error: {0}")]
    HashingError(String),
}
