pub mod clock;
pub mod service;

pub use clock::{Clock, SystemClock};
pub use service::ResetService;

/// Why a reset operation did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    NotFound,
    Expired,
    AlreadyUsed,
    WeakPassword(String),
    Mismatch,
    DeliveryFailure(String),
    PersistenceFailure(String),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::NotFound => write!(f, "Invalid reset token"),
            TokenError::Expired => write!(f, "Reset token has expired. Request a new one."),
            TokenError::AlreadyUsed => {
                write!(f, "Reset token has already been used. Request a new one.")
            }
            TokenError::WeakPassword(reason) => write!(f, "{reason}"),
            TokenError::Mismatch => write!(f, "Passwords do not match"),
            TokenError::DeliveryFailure(msg) => write!(f, "Delivery failure: {msg}"),
            TokenError::PersistenceFailure(msg) => write!(f, "Persistence failure: {msg}"),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<sqlx::Error> for TokenError {
    fn from(err: sqlx::Error) -> Self {
        TokenError::PersistenceFailure(err.to_string())
    }
}
