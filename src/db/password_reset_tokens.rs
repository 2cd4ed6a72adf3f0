use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::PasswordResetTokenRow;

pub async fn create(
    pool: &PgPool,
    token_hash: &str,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<PasswordResetTokenRow, sqlx::Error> {
    sqlx::query_as::<_, PasswordResetTokenRow>(
        "INSERT INTO password_reset_tokens (token_hash, user_id, created_at, expires_at)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(token_hash)
    .bind(user_id)
    .bind(created_at)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_hash(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<PasswordResetTokenRow>, sqlx::Error> {
    sqlx::query_as::<_, PasswordResetTokenRow>(
        "SELECT * FROM password_reset_tokens WHERE token_hash = $1",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}

pub async fn list_by_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<PasswordResetTokenRow>, sqlx::Error> {
    sqlx::query_as::<_, PasswordResetTokenRow>(
        "SELECT * FROM password_reset_tokens WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Flips `consumed` only while the token is still valid at `now`.
/// Returns the owner when this call won the token.
pub async fn consume_if_valid<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    token_hash: &str,
    now: DateTime<Utc>,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        "UPDATE password_reset_tokens SET consumed = true
         WHERE token_hash = $1 AND consumed = false AND expires_at > $2
         RETURNING user_id",
    )
    .bind(token_hash)
    .bind(now)
    .fetch_optional(executor)
    .await
}
