use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::error::AppError;
use crate::routes::MessageResponse;
use crate::state::SharedState;

/// Same text whether or not the email exists.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If that email is registered, a reset link has been sent.";

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.reset.request_reset(req.email.trim()).await?;
    Ok(Json(MessageResponse::new(FORGOT_PASSWORD_MESSAGE)))
}

pub async fn check_reset_token(
    State(state): State<SharedState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.reset.validate(&token).await?;
    Ok(Json(MessageResponse::new("Reset token is valid")))
}

pub async fn reset_password(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .reset
        .confirm_reset(&req.token, &req.password, &req.password_confirm)
        .await?;

    Ok(Json(MessageResponse::new(
        "Password changed successfully. You can now log in.",
    )))
}
