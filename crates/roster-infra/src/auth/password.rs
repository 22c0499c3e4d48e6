//! bcrypt password hashing implementation.

use std::ops::RangeInclusive;
use std::str::FromStr;

use bcrypt::HashParts;

use roster_core::ports::{AuthError, PasswordService};

/// Work factor used when none is configured.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Work factors bcrypt accepts.
pub const BCRYPT_COST_RANGE: RangeInclusive<u32> = 4..=31;

/// bcrypt only reads this many bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// bcrypt-based password service.
///
/// The cost is encoded in every hash it produces (`$2b$10$...`), so hashes
/// made under an older cost keep verifying and can be found with
/// [`PasswordService::needs_rehash`].
pub struct BcryptPasswordService {
    cost: u32,
}

impl BcryptPasswordService {
    pub fn new() -> Self {
        Self::with_cost(DEFAULT_BCRYPT_COST)
    }

    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for BcryptPasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        // Reject instead of letting bcrypt truncate silently.
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::PasswordTooLong {
                max: MAX_PASSWORD_BYTES,
            });
        }

        bcrypt::hash(password, self.cost).map_err(|e| AuthError::HashingError(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }

        match bcrypt::verify(password, hash) {
            Ok(valid) => Ok(valid),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                Ok(false)
            }
        }
    }

    fn needs_rehash(&self, hash: &str) -> bool {
        HashParts::from_str(hash)
            .map(|parts| parts.get_cost() != self.cost)
            .unwrap_or(true)
    }
}
