//! Password hashing backed by bcrypt.
//!
//! Hashes are salted per call, so hashing the same password twice yields two
//! different strings that both verify.

use bcrypt::{hash, verify};

use crate::errors::AppError;

/// bcrypt work factor for stored password hashes.
pub const HASH_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, HASH_COST)
        .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))
}

/// Returns `Ok(false)` on mismatch; `Err` only when `hash` is not a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal_error(format!("Failed to verify password: {}", e)))
}

/// [`hash_password`] on the blocking pool, keeping bcrypt off the async workers.
pub async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(AppError::internal)?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(AppError::internal)?
}
