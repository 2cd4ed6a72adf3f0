use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::db::{self, ResetRepository};
use crate::models::{hash_token_id, PasswordResetToken, PasswordResetTokenRow, User};
use crate::reset::TokenError;

/// In-process repository with the same guarantees as the Postgres one.
#[derive(Default)]
pub struct MemoryRepository {
    users: DashMap<Uuid, User>,
    /// token_hash -> row
    tokens: DashMap<String, PasswordResetTokenRow>,
    unavailable: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|u| u.value().clone())
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Makes every call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), TokenError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(TokenError::PersistenceFailure(
                "repository unavailable".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ResetRepository for MemoryRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, TokenError> {
        self.ensure_available()?;
        Ok(self
            .users
            .iter()
            .find(|u| u.email.to_lowercase() == email.to_lowercase())
            .map(|u| u.value().clone()))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, TokenError> {
        self.ensure_available()?;
        Ok(self.user(id))
    }

    async fn insert_token(&self, token: &PasswordResetToken) -> Result<(), TokenError> {
        self.ensure_available()?;
        self.tokens.insert(
            token.token_hash(),
            PasswordResetTokenRow {
                token_hash: token.token_hash(),
                user_id: token.user_id,
                consumed: token.consumed,
                expires_at: token.expires_at,
                created_at: token.created_at,
            },
        );
        Ok(())
    }

    async fn find_token(&self, id: Uuid) -> Result<Option<PasswordResetToken>, TokenError> {
        self.ensure_available()?;
        Ok(self
            .tokens
            .get(&hash_token_id(&id))
            .map(|row| row.value().clone().into_token(id)))
    }

    async fn list_tokens_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PasswordResetTokenRow>, TokenError> {
        self.ensure_available()?;
        let mut rows: Vec<PasswordResetTokenRow> = self
            .tokens
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| row.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn consume(
        &self,
        id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Uuid, TokenError> {
        self.ensure_available()?;

        // The entry guard holds the shard's write lock until the end of scope.
        let Some(mut row) = self.tokens.get_mut(&hash_token_id(&id)) else {
            return Err(TokenError::NotFound);
        };

        if row.consumed || now >= row.expires_at {
            return Err(db::rejection(Some(row.value().clone().into_token(id)), now));
        }

        let Some(mut user) = self.users.get_mut(&row.user_id) else {
            return Err(TokenError::PersistenceFailure(format!(
                "token owner {} does not exist",
                row.user_id
            )));
        };
        user.password_hash = password_hash.to_string();
        user.must_change_password = false;
        row.consumed = true;

        Ok(row.user_id)
    }
}
