//! Opaque API tokens. A user holds at most one; issuing a new one replaces
//! the old, which stops working immediately.

use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::db;
use crate::error::AppError;
use crate::models::User;

/// Random bytes per token; hex-encoded this gives a 40 character key.
const TOKEN_BYTES: usize = 20;

fn generate() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_BYTES * 2 && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Creates a fresh token for `user` and returns the clear key.
pub async fn issue_token(pool: &PgPool, user: &User) -> Result<String, AppError> {
    let token = generate();
    db::auth_tokens::replace(pool, user.id, &hash_token(&token)).await?;
    tracing::debug!(user_id = %user.id, "issued api token");
    Ok(token)
}

/// Resolves a clear token to its active user.
pub async fn authenticate(pool: &PgPool, token: &str) -> Result<User, AppError> {
    if !is_well_formed(token) {
        return Err(AppError::Unauthorized("Invalid token.".to_string()));
    }

    let user = db::auth_tokens::find_user_by_hash(pool, &hash_token(token))
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid token.".to_string()))?;

    if !user.is_active {
        return Err(AppError::Unauthorized(
            "User inactive or deleted.".to_string(),
        ));
    }

    Ok(user)
}
