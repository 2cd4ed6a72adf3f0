use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::auth::policy::{Action, Resource};
use crate::error::AppError;
use crate::models::ResetTokenSummary;
use crate::routes::MessageResponse;
use crate::state::SharedState;

pub async fn issue_password_reset(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require(Action::IssuePasswordReset, Resource::Account(id))?;

    let user = state
        .reset
        .account(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    state.reset.send_reset_link(&user).await?;

    tracing::info!(actor = %auth.user_id, user_id = %user.id, "password reset issued by staff");
    Ok(Json(MessageResponse::new(format!(
        "A reset link has been sent to {}",
        user.email
    ))))
}

pub async fn list_password_reset_tokens(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ResetTokenSummary>>, AppError> {
    auth.require(Action::ViewResetTokens, Resource::Account(id))?;

    state
        .reset
        .account(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(state.reset.list_tokens(id).await?))
}
