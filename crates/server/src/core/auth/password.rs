//! bcrypt hashing, run off the async executor.

use anyhow::{Context, Result};

/// Cost used when none is configured.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

pub async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("Password hashing task failed")?
        .context("Failed to hash password")
}

pub async fn verify_password(password: String, password_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .context("Password verification task failed")?
        .context("Failed to verify password")
}
