use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AuthToken, User};

/// Stores the token hash for a user, replacing whatever token they had.
pub async fn replace(
    pool: &PgPool,
    user_id: Uuid,
    token_hash: &str,
) -> Result<AuthToken, sqlx::Error> {
    sqlx::query_as::<_, AuthToken>(
        "INSERT INTO auth_tokens (user_id, token_hash) VALUES ($1, $2)
         ON CONFLICT (user_id)
         DO UPDATE SET token_hash = EXCLUDED.token_hash, created_at = now()
         RETURNING *",
    )
    .bind(user_id)
    .bind(token_hash)
    .fetch_one(pool)
    .await
}

pub async fn find_user_by_hash(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT u.* FROM auth_tokens t
         JOIN users u ON u.id = t.user_id
         WHERE t.token_hash = $1",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}
