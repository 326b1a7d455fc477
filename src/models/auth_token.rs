use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Stored half of an API token. Only the SHA-256 of the key is kept.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthToken {
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}
