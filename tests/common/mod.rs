//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use axum::http::{header::LOCATION, StatusCode};
use axum_extra::extract::cookie::Cookie;
use axum_test::{TestResponse, TestServer};
use chrono::{DateTime, TimeZone, Utc};
use diary::api;
use diary::config::{
    Config, DatabaseConfig, EntryLimits, LogFormat, LoggingConfig, RateLimitConfig, ServerConfig,
    SessionConfig,
};
use diary::db::{self, DbPool, PoolConfig};
use diary::models::{EntryDraft, Mood};
use diary::AppState;

pub const PASSWORD: &str = "Secret123";

/// Configuration used by every test server.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        },
        database: DatabaseConfig {
            path: ":memory:".into(),
        },
        session: SessionConfig {
            max_age_seconds: 3600,
            cookie_secure: false,
        },
        entries: EntryLimits::default(),
        rate_limit: RateLimitConfig {
            login_per_minute: 100,
            max_tracked_usernames: 10_000,
        },
        logging: LoggingConfig {
            format: LogFormat::Pretty,
        },
    }
}

/// In-memory database with the schema applied.
pub async fn setup_test_db() -> DbPool {
    let pool = db::create_pool_with_config(":memory:", PoolConfig::test())
        .await
        .expect("Failed to create test database");
    db::initialize_schema(&pool)
        .await
        .expect("Failed to initialize schema");
    pool
}

/// Build the full application around a fresh database.
pub async fn build_test_app() -> (TestServer, DbPool) {
    let pool = setup_test_db().await;
    let state = AppState::with_pool(pool.clone(), &test_config()).expect("Failed to build state");
    let server = TestServer::new(api::app(state)).expect("Failed to start test server");
    (server, pool)
}

/// Session credentials of a signed-in user.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user_id: i64,
    pub session_id: String,
    pub csrf_token: String,
}

impl SignedIn {
    pub fn cookie(&self) -> Cookie<'static> {
        Cookie::new("diary_session", self.session_id.clone())
    }
}

/// Fetch the anonymous CSRF cookie issued with the login form.
pub async fn anonymous_csrf(server: &TestServer) -> Cookie<'static> {
    let response = server.get("/login").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.cookie("diary_csrf")
}

pub fn location(response: &TestResponse) -> String {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Register through the HTTP form and return the new session.
pub async fn register(server: &TestServer, pool: &DbPool, username: &str) -> SignedIn {
    let csrf = anonymous_csrf(server).await;
    let token = csrf.value().to_string();

    let response = server
        .post("/register")
        .add_cookie(csrf)
        .form(&[
            ("csrf_token", token.as_str()),
            ("username", username),
            ("password", PASSWORD),
            ("confirm_password", PASSWORD),
        ])
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/entries");

    signed_in_from(pool, response.cookie("diary_session").value()).await
}

/// Log in through the HTTP form and return the new session.
pub async fn login(server: &TestServer, pool: &DbPool, username: &str, password: &str) -> SignedIn {
    let csrf = anonymous_csrf(server).await;
    let token = csrf.value().to_string();

    let response = server
        .post("/login")
        .add_cookie(csrf)
        .form(&[
            ("csrf_token", token.as_str()),
            ("username", username),
            ("password", password),
        ])
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    signed_in_from(pool, response.cookie("diary_session").value()).await
}

async fn signed_in_from(pool: &DbPool, session_id: &str) -> SignedIn {
    let session = db::get_session(pool, session_id)
        .await
        .expect("Failed to read session")
        .expect("Session was not stored");

    SignedIn {
        user_id: session.user_id,
        session_id: session.id,
        csrf_token: session.csrf_token,
    }
}

pub fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

/// Insert an entry directly with a chosen creation time.
pub async fn insert_entry(
    pool: &DbPool,
    user_id: i64,
    created_at: DateTime<Utc>,
    body: &str,
    mood: Option<Mood>,
    tags: &[&str],
) -> i64 {
    let draft = EntryDraft {
        title: None,
        body: body.to_string(),
        mood,
        weather: None,
        location: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        category_id: None,
        word_count: body.split_whitespace().count() as i64,
    };
    db::create_entry(pool, user_id, &draft, created_at)
        .await
        .expect("Failed to insert entry")
        .id
}
