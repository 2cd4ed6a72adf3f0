pub mod memory;
pub mod password_reset_tokens;
pub mod postgres;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{PasswordResetToken, PasswordResetTokenRow, User};
use crate::reset::TokenError;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Storage the reset lifecycle runs against.
#[async_trait]
pub trait ResetRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, TokenError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, TokenError>;

    async fn insert_token(&self, token: &PasswordResetToken) -> Result<(), TokenError>;

    async fn find_token(&self, id: Uuid) -> Result<Option<PasswordResetToken>, TokenError>;

    /// Newest first.
    async fn list_tokens_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PasswordResetTokenRow>, TokenError>;

    /// Marks the token consumed and stores `password_hash` on its owner, but
    /// only if the token is unconsumed and unexpired at `now`. Check and write
    /// happen as one atomic step. Returns the owner's id.
    async fn consume(
        &self,
        id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Uuid, TokenError>;
}

/// Why a token that failed the consume guard was rejected.
pub(crate) fn rejection(token: Option<PasswordResetToken>, now: DateTime<Utc>) -> TokenError {
    match token {
        None => TokenError::NotFound,
        Some(token) if token.is_expired(now) => TokenError::Expired,
        Some(_) => TokenError::AlreadyUsed,
    }
}
