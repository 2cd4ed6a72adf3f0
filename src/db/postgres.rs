use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{self, ResetRepository};
use crate::models::{hash_token_id, PasswordResetToken, PasswordResetTokenRow, User};
use crate::reset::TokenError;

pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ResetRepository for PgRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, TokenError> {
        Ok(db::users::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, TokenError> {
        Ok(db::users::find_by_id(&self.pool, id).await?)
    }

    async fn insert_token(&self, token: &PasswordResetToken) -> Result<(), TokenError> {
        db::password_reset_tokens::create(
            &self.pool,
            &token.token_hash(),
            token.user_id,
            token.created_at,
            token.expires_at,
        )
        .await?;
        Ok(())
    }

    async fn find_token(&self, id: Uuid) -> Result<Option<PasswordResetToken>, TokenError> {
        let row = db::password_reset_tokens::find_by_hash(&self.pool, &hash_token_id(&id)).await?;
        Ok(row.map(|row| row.into_token(id)))
    }

    async fn list_tokens_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PasswordResetTokenRow>, TokenError> {
        Ok(db::password_reset_tokens::list_by_user(&self.pool, user_id).await?)
    }

    async fn consume(
        &self,
        id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Uuid, TokenError> {
        let token_hash = hash_token_id(&id);

        let mut tx = self.pool.begin().await?;
        let claimed =
            db::password_reset_tokens::consume_if_valid(&mut *tx, &token_hash, now).await?;

        let Some(user_id) = claimed else {
            tx.rollback().await?;
            let current = self.find_token(id).await?;
            return Err(db::rejection(current, now));
        };

        db::users::update_password(&mut *tx, user_id, password_hash).await?;
        tx.commit().await?;

        Ok(user_id)
    }
}
