//! Salted SHA-256 password hashing.
//!
//! Hex-encoded SHA-256 of `password + salt`, with a UUID salt per account.
//! This is deliberately the textbook scheme the demo is built to exhibit --
//! a production system would use a memory-hard KDF instead.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generate a fresh per-account salt.
pub fn generate_salt() -> String {
    Uuid::new_v4().to_string()
}

/// Compute the lowercase hex SHA-256 digest of `password + salt`.
pub fn hash_password(password: &str, salt: &str) -> String {
    let digest = Sha256::digest(format!("{password}{salt}").as_bytes());
    format!("{:x}", digest)
}

/// Check a password attempt against a stored hash.
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}
