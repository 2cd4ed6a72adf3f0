pub mod admin;
pub mod auth;

use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::state::SharedState;

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Password reset
        .route("/api/v1/auth/forgot-password", post(auth::forgot_password))
        .route("/api/v1/auth/reset-password", post(auth::reset_password))
        .route(
            "/api/v1/auth/reset-password/{token}",
            get(auth::check_reset_token),
        )
        // Admin
        .route(
            "/api/v1/admin/users/{id}/password-reset",
            post(admin::issue_password_reset),
        )
        .route(
            "/api/v1/admin/users/{id}/password-reset-tokens",
            get(admin::list_password_reset_tokens),
        )
}
