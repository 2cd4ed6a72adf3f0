use std::sync::Arc;

use uuid::Uuid;

use crate::auth::password;
use crate::config::ResetConfig;
use crate::db::ResetRepository;
use crate::email::ResetNotifier;
use crate::models::{PasswordResetToken, ResetTokenSummary, User};
use crate::rate_limit::ResetRequestLimiter;
use crate::reset::{Clock, SystemClock, TokenError};

/// Issues, validates and consumes password-reset tokens.
pub struct ResetService {
    repo: Arc<dyn ResetRepository>,
    notifier: Arc<dyn ResetNotifier>,
    clock: Arc<dyn Clock>,
    limiter: ResetRequestLimiter,
    config: ResetConfig,
    base_url: String,
}

impl ResetService {
    pub fn new(
        repo: Arc<dyn ResetRepository>,
        notifier: Arc<dyn ResetNotifier>,
        base_url: impl Into<String>,
        config: ResetConfig,
    ) -> Self {
        Self {
            repo,
            notifier,
            clock: Arc::new(SystemClock),
            limiter: ResetRequestLimiter::per_hour(config.requests_per_hour),
            config,
            base_url: base_url.into(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn limiter(&self) -> &ResetRequestLimiter {
        &self.limiter
    }

    pub async fn account(&self, id: Uuid) -> Result<Option<User>, TokenError> {
        self.repo.find_user_by_id(id).await
    }

    /// Persists a fresh token for `user_id`. Earlier tokens stay untouched.
    pub async fn issue(&self, user_id: Uuid) -> Result<PasswordResetToken, TokenError> {
        let token = PasswordResetToken::issue(user_id, self.clock.now(), self.config.token_ttl)
            .ok_or_else(|| {
                TokenError::PersistenceFailure("token expiry is out of range".to_string())
            })?;
        self.repo.insert_token(&token).await?;
        tracing::info!(%user_id, expires_at = %token.expires_at, "password reset token issued");
        Ok(token)
    }

    /// Read-only check that `token_id` still authorizes a password change.
    pub async fn validate(&self, token_id: &str) -> Result<PasswordResetToken, TokenError> {
        let id = parse_token_id(token_id).ok_or(TokenError::NotFound)?;
        let token = self
            .repo
            .find_token(id)
            .await?
            .ok_or(TokenError::NotFound)?;

        if token.is_expired(self.clock.now()) {
            return Err(TokenError::Expired);
        }
        if token.consumed {
            return Err(TokenError::AlreadyUsed);
        }
        Ok(token)
    }

    /// Spends the token on a new password for its owner.
    pub async fn consume(&self, token_id: &str, new_password: &str) -> Result<(), TokenError> {
        let token = self.validate(token_id).await?;

        self.config
            .password_policy
            .check(new_password)
            .map_err(TokenError::WeakPassword)?;

        let pw_hash = password::hash(new_password).map_err(TokenError::PersistenceFailure)?;

        // Validity is re-checked inside the repository; a racing consume loses here.
        let user_id = self
            .repo
            .consume(token.id, &pw_hash, self.clock.now())
            .await?;

        tracing::info!(%user_id, "password reset completed");
        Ok(())
    }

    /// Entry point for the forgot-password form. Succeeds identically whether
    /// or not `email` belongs to an account.
    pub async fn request_reset(&self, email: &str) -> Result<(), TokenError> {
        let Some(user) = self.repo.find_user_by_email(email).await? else {
            tracing::debug!("password reset requested for unknown email");
            return Ok(());
        };

        if !user.is_active {
            tracing::debug!(user_id = %user.id, "password reset requested for inactive account");
            return Ok(());
        }

        if let Err(retry_after) = self.limiter.check(email) {
            tracing::warn!(
                user_id = %user.id,
                retry_after,
                "password reset request limit reached"
            );
            return Ok(());
        }

        self.send_reset_link(&user).await
    }

    /// Issues a token for `user` and delivers the link.
    pub async fn send_reset_link(&self, user: &User) -> Result<(), TokenError> {
        let token = self.issue(user.id).await?;
        let reset_url = self.reset_url(&token);

        self.notifier
            .send_password_reset(user, &reset_url, self.config.token_ttl.num_minutes())
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, "Failed to send password reset email: {e}");
                TokenError::DeliveryFailure(e)
            })
    }

    /// Entry point for the reset form. A dead token is reported before a
    /// confirmation mismatch; both password fields must match exactly.
    pub async fn confirm_reset(
        &self,
        token_id: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<(), TokenError> {
        self.validate(token_id).await?;
        if password != password_confirm {
            return Err(TokenError::Mismatch);
        }
        self.consume(token_id, password).await
    }

    pub async fn list_tokens(&self, user_id: Uuid) -> Result<Vec<ResetTokenSummary>, TokenError> {
        let now = self.clock.now();
        let rows = self.repo.list_tokens_for_user(user_id).await?;
        Ok(rows.iter().map(|row| row.summary(now)).collect())
    }

    fn reset_url(&self, token: &PasswordResetToken) -> String {
        format!(
            "{}/auth/reset-password?token={}",
            self.base_url.trim_end_matches('/'),
            token.id.hyphenated()
        )
    }
}

/// Only the lowercase hyphenated form names a token.
fn parse_token_id(token_id: &str) -> Option<Uuid> {
    let id = Uuid::try_parse(token_id).ok()?;
    (id.hyphenated().to_string() == token_id).then_some(id)
}
