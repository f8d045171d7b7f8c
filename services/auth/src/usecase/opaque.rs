//! Opaque bearer secrets (refresh and password reset tokens).

use std::hint::black_box;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use sha2::{Digest, Sha256};

use crate::domain::types::OPAQUE_TOKEN_BYTES;

/// 256 random bits, base64url without padding.
pub fn generate_token() -> String {
    let bytes: [u8; OPAQUE_TOKEN_BYTES] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Storage key for a token value. Lowercase hex SHA-256.
pub fn hash_token(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Compare two byte strings without early exit on the first mismatch.
///
/// Only the length may leak; callers compare fixed-length hashes.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a
        .iter()
        .zip(b)
        .fold(0u8, |acc, (x, y)| black_box(acc | (x ^ y)));
    black_box(diff) == 0
}
