//! Argon2id password hashing.

use std::sync::OnceLock;

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use rand::RngExt;

use crate::domain::types::MAX_PASSWORD_BYTES;
use crate::error::AuthServiceError;

const SUPPORTED_ALGORITHM: &str = "argon2id";

/// Hashed at most once per process; verified against for unknown accounts.
static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Salted, memory-hard password hashing with PHC-string records.
///
/// Uses Argon2id with the crate's default parameters. Verification re-derives
/// with the parameters stored in the record, so records written under older
/// parameters keep verifying.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    pub min_length: usize,
}

impl PasswordHasher {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Reject passwords outside the length policy.
    pub fn check_policy(&self, password: &str) -> Result<(), AuthServiceError> {
        if password.chars().count() < self.min_length || password.len() > MAX_PASSWORD_BYTES {
            return Err(AuthServiceError::WeakPassword);
        }
        Ok(())
    }

    pub fn hash(&self, password: &str) -> Result<String, AuthServiceError> {
        let salt_bytes: [u8; 16] = rand::rng().random();
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| anyhow::anyhow!("encode password salt: {e}"))?;
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("hash password: {e}"))?;
        Ok(hash.to_string())
    }

    /// Returns `Ok(false)` on mismatch and `CorruptCredential` when the record
    /// cannot be parsed or names another algorithm.
    pub fn verify(&self, record: &str, candidate: &str) -> Result<bool, AuthServiceError> {
        let parsed = PasswordHash::new(record)
            .map_err(|e| AuthServiceError::CorruptCredential(format!("invalid hash format: {e}")))?;
        if parsed.algorithm.as_str() != SUPPORTED_ALGORITHM {
            return Err(AuthServiceError::CorruptCredential(format!(
                "unsupported algorithm: {}",
                parsed.algorithm
            )));
        }
        match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthServiceError::CorruptCredential(format!(
                "verify error: {e}"
            ))),
        }
    }

    /// Spend the same work as a real verification. Used when no account matches.
    pub fn verify_dummy(&self, candidate: &str) {
        let record = DUMMY_HASH.get_or_init(|| {
            self.hash("campus-dummy-password").unwrap_or_default()
        });
        let _ = self.verify(record, candidate);
    }
}
