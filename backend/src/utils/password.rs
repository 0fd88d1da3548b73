//! Password hashing with bcrypt.

use crate::errors::{ServiceError, ServiceResult};
use bcrypt::{BcryptError, non_truncating_hash, non_truncating_verify};

/// Hashes and verifies passwords at a fixed bcrypt cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Function to hash a password before storing in database
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if the password exceeds 72 bytes,
    /// `ServiceError::InternalError` if hashing fails
    pub fn hash_password(&self, password: &str) -> ServiceResult<String> {
        non_truncating_hash(password, self.cost).map_err(|e| match e {
            BcryptError::Truncation(_) => {
                ServiceError::validation("Password must be at most 72 bytes")
            }
            e => ServiceError::internal_error(format!("Password hashing failed: {}", e)),
        })
    }

    /// Function to verify a password against the stored hash
    ///
    /// # Returns
    /// `true` if password matches hash, `false` otherwise. Input longer than
    /// 72 bytes never matches.
    ///
    /// # Errors
    /// Returns `ServiceError::InternalError` if the stored hash is malformed
    pub fn verify_password(&self, password: &str, hash: &str) -> ServiceResult<bool> {
        match non_truncating_verify(password, hash) {
            Ok(matches) => Ok(matches),
            Err(BcryptError::Truncation(_)) => Ok(false),
            Err(e) => Err(ServiceError::internal_error(format!(
                "Password verification failed: {}",
                e
            ))),
        }
    }
}
