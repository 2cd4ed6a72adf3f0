mod password_reset_token;
mod user;

pub use password_reset_token::{
    hash_token_id, PasswordResetToken, PasswordResetTokenRow, ResetTokenSummary, TokenStatus,
};
pub use user::User;
