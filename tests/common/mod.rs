#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use stockdesk::auth::jwt::{encode_token, Claims};
use stockdesk::auth::password;
use stockdesk::config::{Config, ResetConfig};
use stockdesk::db::MemoryRepository;
use stockdesk::email::ResetNotifier;
use stockdesk::models::User;
use stockdesk::reset::clock::ManualClock;
use stockdesk::reset::ResetService;
use stockdesk::state::AppState;

pub const JWT_SECRET: &str = "test-jwt-secret-that-is-long-enough";

/// Captures reset links instead of mailing them.
#[derive(Default)]
pub struct Outbox {
    sent: Mutex<Vec<(String, String)>>,
    failing: Mutex<bool>,
}

impl Outbox {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    /// Token from the most recent link sent to `email`.
    pub fn last_token_for(&self, email: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|(to, _)| to == email)
            .and_then(|(_, url)| url.rsplit_once("token=").map(|(_, t)| t.to_string()))
    }
}

#[async_trait]
impl ResetNotifier for Outbox {
    async fn send_password_reset(
        &self,
        user: &User,
        reset_url: &str,
        _valid_minutes: i64,
    ) -> Result<(), String> {
        if *self.failing.lock().unwrap() {
            return Err("smtp relay unreachable".to_string());
        }
        self.sent
            .lock()
            .unwrap()
            .push((user.email.clone(), reset_url.to_string()));
        Ok(())
    }
}

/// A running test server backed by the in-memory repository.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub repo: Arc<MemoryRepository>,
    pub clock: Arc<ManualClock>,
    pub outbox: Arc<Outbox>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Insert an account straight into the repository.
    pub fn seed_user(&self, email: &str, pw: &str, role: &str, is_superuser: bool) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password::hash(pw).unwrap(),
            name: email.split('@').next().unwrap().to_string(),
            role: role.to_string(),
            is_superuser,
            is_active: true,
            must_change_password: true,
            created_at: Utc::now(),
        };
        self.repo.insert_user(user.clone());
        user
    }

    /// Bearer token as the dashboard would issue it for `user`.
    pub fn bearer_for(&self, user: &User) -> String {
        let claims = Claims::new(user.id, user.role.clone(), user.is_superuser);
        encode_token(&claims, JWT_SECRET).unwrap()
    }

    pub async fn forgot_password(&self, email: &str) -> (String, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/forgot-password"))
            .json(&json!({ "email": email }))
            .send()
            .await
            .expect("forgot-password request failed");
        let status = resp.status();
        (resp.text().await.unwrap(), status)
    }

    pub async fn check_token(&self, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(&format!("/api/v1/auth/reset-password/{token}")))
            .send()
            .await
            .expect("check token request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        password_confirm: &str,
    ) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/reset-password"))
            .json(&json!({
                "token": token,
                "password": password,
                "password_confirm": password_confirm,
            }))
            .send()
            .await
            .expect("reset-password request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated POST request without a body.
    pub async fn post_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn test_config(database_url: &str) -> Config {
    Config {
        database_url: database_url.to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: "http://localhost:0".to_string(),
        max_body_size: 65_536,
        log_level: "warn".to_string(),
        reset: ResetConfig {
            requests_per_hour: 3,
            ..ResetConfig::default()
        },
        smtp: None,
    }
}

/// Spawn a test app on a random port with fresh in-memory state.
pub async fn spawn_app() -> TestApp {
    let config = test_config("postgres://unused");
    let repo = Arc::new(MemoryRepository::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let outbox = Arc::new(Outbox::default());

    let reset = ResetService::new(
        repo.clone(),
        outbox.clone(),
        config.base_url.clone(),
        config.reset.clone(),
    )
    .with_clock(clock.clone());
    let state = Arc::new(AppState { config, reset });
    let app = stockdesk::build_router(state);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        repo,
        clock,
        outbox,
    }
}

/// A migrated, dedicated database, or None when DATABASE_URL is unset.
pub struct TestDb {
    pub pool: PgPool,
    pub db_name: String,
    admin_url: String,
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

pub async fn test_db() -> Option<TestDb> {
    let _ = dotenvy::dotenv();
    let base_url = std::env::var("DATABASE_URL").ok()?;

    let db_name = format!("stockdesk_test_{}", Uuid::now_v7().to_string().replace('-', ""));
    let admin_url = admin_url(&base_url);

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    Some(TestDb {
        pool,
        db_name,
        admin_url,
    })
}

/// Drop the test database after tests complete.
pub async fn cleanup(db: TestDb) {
    db.pool.close().await;

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&db.admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!(
        "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
        db.db_name
    ))
    .execute(&admin_pool)
    .await;

    admin_pool.close().await;
}
