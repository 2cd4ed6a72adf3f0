use std::net::IpAddr;

use chrono::Duration;

use crate::auth::password::PasswordPolicy;

/// Longest accepted reset-token lifetime: one week.
const MAX_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub max_body_size: usize,
    pub log_level: String,
    pub reset: ResetConfig,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct ResetConfig {
    pub token_ttl: Duration,
    pub requests_per_hour: u32,
    pub password_policy: PasswordPolicy,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::hours(1),
            requests_per_hour: 5,
            password_policy: PasswordPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("STOCKDESK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid STOCKDESK_HOST: {e}"))?;

        let port: u16 = env_or("STOCKDESK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid STOCKDESK_PORT: {e}"))?;

        let base_url = env_or("STOCKDESK_BASE_URL", &format!("http://{host}:{port}"));

        let max_body_size: usize = env_or("STOCKDESK_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid STOCKDESK_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("STOCKDESK_LOG_LEVEL", "info");

        let token_ttl = parse_token_ttl(&env_or("STOCKDESK_RESET_TOKEN_TTL_MINUTES", "60"))?;

        let requests_per_hour: u32 = env_or("STOCKDESK_RESET_REQUESTS_PER_HOUR", "5")
            .parse()
            .map_err(|e| format!("Invalid STOCKDESK_RESET_REQUESTS_PER_HOUR: {e}"))?;

        let min_length: usize = env_or("STOCKDESK_PASSWORD_MIN_LENGTH", "8")
            .parse()
            .map_err(|e| format!("Invalid STOCKDESK_PASSWORD_MIN_LENGTH: {e}"))?;

        let require_mixed = match env_or("STOCKDESK_PASSWORD_REQUIRE_MIXED", "false").as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(format!(
                    "Invalid STOCKDESK_PASSWORD_REQUIRE_MIXED '{other}': expected true or false"
                ));
            }
        };

        let smtp = match (
            std::env::var("STOCKDESK_SMTP_HOST").ok(),
            std::env::var("STOCKDESK_SMTP_PORT").ok(),
            std::env::var("STOCKDESK_SMTP_USER").ok(),
            std::env::var("STOCKDESK_SMTP_PASS").ok(),
            std::env::var("STOCKDESK_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid STOCKDESK_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            base_url,
            max_body_size,
            log_level,
            reset: ResetConfig {
                token_ttl,
                requests_per_hour,
                password_policy: PasswordPolicy {
                    min_length,
                    require_uppercase: require_mixed,
                    require_digit: require_mixed,
                },
            },
            smtp,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_token_ttl(raw: &str) -> Result<Duration, String> {
    let minutes: i64 = raw
        .parse()
        .map_err(|e| format!("Invalid STOCKDESK_RESET_TOKEN_TTL_MINUTES: {e}"))?;
    if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) {
        return Err(format!(
            "STOCKDESK_RESET_TOKEN_TTL_MINUTES must be between 1 and {MAX_TOKEN_TTL_MINUTES}"
        ));
    }
    Duration::try_minutes(minutes)
        .ok_or_else(|| "STOCKDESK_RESET_TOKEN_TTL_MINUTES is out of range".to_string())
}
