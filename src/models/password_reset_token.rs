use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Single-use credential authorizing one password change for `user_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

impl PasswordResetToken {
    /// A fresh, unconsumed token issued at `now`. `None` when `now + ttl`
    /// is not a representable instant.
    pub fn issue(user_id: Uuid, now: DateTime<Utc>, ttl: chrono::Duration) -> Option<Self> {
        let expires_at = now.checked_add_signed(ttl)?;
        Some(Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: now,
            expires_at,
            consumed: false,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.consumed && !self.is_expired(now)
    }

    pub fn token_hash(&self) -> String {
        hash_token_id(&self.id)
    }
}

/// Storage key for a token: the identifier itself is never persisted.
pub fn hash_token_id(id: &Uuid) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.hyphenated().to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Stored form of a token, keyed by the hash of its identifier.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PasswordResetTokenRow {
    pub token_hash: String,
    pub user_id: Uuid,
    pub consumed: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetTokenRow {
    pub fn into_token(self, id: Uuid) -> PasswordResetToken {
        PasswordResetToken {
            id,
            user_id: self.user_id,
            created_at: self.created_at,
            expires_at: self.expires_at,
            consumed: self.consumed,
        }
    }

    pub fn summary(&self, now: DateTime<Utc>) -> ResetTokenSummary {
        let status = if self.consumed {
            TokenStatus::Used
        } else if now >= self.expires_at {
            TokenStatus::Expired
        } else {
            TokenStatus::Valid
        };
        ResetTokenSummary {
            created_at: self.created_at,
            expires_at: self.expires_at,
            consumed: self.consumed,
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    Valid,
    Expired,
    Used,
}

/// What an administrator may see about a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetTokenSummary {
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
    pub status: TokenStatus,
}
