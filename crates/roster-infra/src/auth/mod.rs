//! Credential implementations.

mod password;

pub use password::{
    BCRYPT_COST_RANGE, BcryptPasswordService, DEFAULT_BCRYPT_COST, MAX_PASSWORD_BYTES,
};
