pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod reset;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::ResetRepository;
use crate::email::{LogNotifier, ResetNotifier, SystemMailer};
use crate::reset::ResetService;
use crate::state::{AppState, SharedState};

pub fn build_state(repo: Arc<dyn ResetRepository>, config: Config) -> SharedState {
    let notifier: Arc<dyn ResetNotifier> = match config.smtp.as_ref().map(SystemMailer::new) {
        Some(Ok(mailer)) => {
            tracing::info!("System SMTP configured");
            Arc::new(mailer)
        }
        Some(Err(e)) => {
            tracing::warn!("System SMTP not available: {e}");
            Arc::new(LogNotifier)
        }
        None => Arc::new(LogNotifier),
    };

    let reset = ResetService::new(
        repo,
        notifier,
        config.base_url.clone(),
        config.reset.clone(),
    );

    Arc::new(AppState { config, reset })
}

pub fn build_router(state: SharedState) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

pub fn build_app(repo: Arc<dyn ResetRepository>, config: Config) -> (Router, SharedState) {
    let state = build_state(repo, config);
    (build_router(state.clone()), state)
}

async fn health() -> &'static str {
    "ok"
}
