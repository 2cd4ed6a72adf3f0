pub mod templates;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::models::User;

/// Delivers reset links to account owners.
#[async_trait]
pub trait ResetNotifier: Send + Sync {
    async fn send_password_reset(
        &self,
        user: &User,
        reset_url: &str,
        valid_minutes: i64,
    ) -> Result<(), String>;
}

pub struct SystemMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SystemMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("System SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }

    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), String> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .to(to.parse().map_err(|e| format!("Invalid to address: {e}"))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}

#[async_trait]
impl ResetNotifier for SystemMailer {
    async fn send_password_reset(
        &self,
        user: &User,
        reset_url: &str,
        valid_minutes: i64,
    ) -> Result<(), String> {
        let html = templates::render_password_reset(&user.name, reset_url, valid_minutes)
            .map_err(|e| format!("Failed to render reset email: {e}"))?;
        self.send(&user.email, "Password Reset - Stockdesk", &html)
            .await
    }
}

/// Stand-in when no SMTP relay is configured: the link only reaches the log.
pub struct LogNotifier;

#[async_trait]
impl ResetNotifier for LogNotifier {
    async fn send_password_reset(
        &self,
        user: &User,
        reset_url: &str,
        _valid_minutes: i64,
    ) -> Result<(), String> {
        tracing::warn!(
            user_id = %user.id,
            "System SMTP not configured. Password reset link: {reset_url}"
        );
        Ok(())
    }
}
