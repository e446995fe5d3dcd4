//! Auth service for local accounts and session management.
//!
//! Handles:
//! - Registration with argon2 password hashing
//! - Login with per-username rate limiting
//! - Logout and password change

use std::num::NonZeroU32;
use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, info, warn};

use crate::config::{RateLimitConfig, SessionConfig};
use crate::db::{self, CreateSession, CreateUser, DbPool};
use crate::error::{Error, Result};
use crate::models::{validate_password, validate_username, Session, User};

/// Length of session ids and CSRF tokens.
const TOKEN_LENGTH: usize = 32;

/// Service for authentication and session lifecycle.
#[derive(Clone)]
pub struct AuthService {
    db: DbPool,
    session_max_age: Duration,
    login_limiter: Arc<DefaultKeyedRateLimiter<String>>,
    max_tracked_usernames: usize,
    /// Hash verified when the username is unknown, so both failure paths
    /// cost one argon2 verification.
    dummy_hash: Arc<String>,
}

/// A freshly created login session.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub session_id: String,
    pub csrf_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthService {
    /// Create a new auth service.
    pub fn new(db: DbPool, session: &SessionConfig, rate_limit: &RateLimitConfig) -> Result<Self> {
        let per_minute = NonZeroU32::new(rate_limit.login_per_minute).unwrap_or(NonZeroU32::MIN);
        let dummy_hash = hash_password(&nanoid::nanoid!(TOKEN_LENGTH))?;

        Ok(Self {
            db,
            session_max_age: Duration::seconds(session.max_age_seconds as i64),
            login_limiter: Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute))),
            max_tracked_usernames: rate_limit.max_tracked_usernames.max(1),
            dummy_hash: Arc::new(dummy_hash),
        })
    }

    /// Session lifetime used for new sessions and cookie Max-Age.
    pub fn session_max_age(&self) -> Duration {
        self.session_max_age
    }

    /// Register a new account.
    pub async fn register(&self, username: &str, password: &str, confirm: &str) -> Result<User> {
        let username = username.trim();
        validate_username(username)?;
        if password != confirm {
            return Err(Error::Validation("Passwords do not match".into()));
        }
        validate_password(password)?;

        if db::get_user_by_username(&self.db, username).await?.is_some() {
            return Err(Error::AlreadyExists("Username already exists".into()));
        }

        let password_hash = hash_off_thread(password.to_string()).await?;
        let user = db::create_user(
            &self.db,
            CreateUser {
                username: username.to_string(),
                password_hash,
            },
        )
        .await?;

        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verify credentials and open a session.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult> {
        let username = username.trim();

        if let Err(e) = self.check_login_budget(&username.to_lowercase()) {
            warn!(username = %username, "Login rate limit exceeded");
            return Err(e);
        }

        let user = db::get_user_by_username(&self.db, username).await?;

        let verified = match &user {
            Some(user) => verify_off_thread(password.to_string(), user.password_hash.clone()).await?,
            None => {
                verify_off_thread(password.to_string(), self.dummy_hash.as_ref().clone()).await?;
                false
            }
        };

        let user = match user {
            Some(user) if verified => user,
            _ => {
                warn!(username = %username, "Failed login attempt");
                return Err(Error::InvalidCredentials);
            }
        };

        let purged = db::cleanup_expired_sessions(&self.db).await?;
        if purged > 0 {
            debug!(count = purged, "Purged expired sessions");
        }

        db::update_last_login(&self.db, user.id).await?;
        let session = self.open_session(user.id).await?;

        info!(user_id = user.id, username = %user.username, "User logged in");

        Ok(LoginResult {
            user,
            session_id: session.id,
            csrf_token: session.csrf_token,
            expires_at: session.expires_at,
        })
    }

    /// End a session. Unknown ids are ignored.
    pub async fn logout(&self, session_id: &str) -> Result<()> {
        db::delete_session(&self.db, session_id).await?;
        debug!("Session ended");
        Ok(())
    }

    /// Change a password after checking the current one. Every other
    /// session of the user is revoked.
    pub async fn change_password(
        &self,
        user_id: i64,
        session_id: &str,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<()> {
        let user = db::get_user(&self.db, user_id).await?;

        if !verify_off_thread(current.to_string(), user.password_hash.clone()).await? {
            return Err(Error::InvalidCredentials);
        }
        if new != confirm {
            return Err(Error::Validation("New passwords do not match".into()));
        }
        validate_password(new)?;

        let password_hash = hash_off_thread(new.to_string()).await?;
        db::update_password_hash(&self.db, user.id, &password_hash).await?;
        let revoked = db::delete_other_sessions(&self.db, user.id, session_id).await?;

        info!(user_id = user.id, revoked_sessions = revoked, "Password changed");
        Ok(())
    }

    /// Spend one login attempt for `key`. Idle limiter state is pruned
    /// once the number of tracked usernames reaches the configured cap.
    fn check_login_budget(&self, key: &str) -> Result<()> {
        if self.login_limiter.len() >= self.max_tracked_usernames {
            self.login_limiter.retain_recent();
            self.login_limiter.shrink_to_fit();
            debug!(tracked = self.login_limiter.len(), "Pruned login limiter");
        }

        self.login_limiter
            .check_key(&key.to_string())
            .map_err(|_| Error::RateLimitExceeded)
    }

    async fn open_session(&self, user_id: i64) -> Result<Session> {
        let expires_at = Utc::now() + self.session_max_age;
        db::create_session(
            &self.db,
            CreateSession {
                id: nanoid::nanoid!(TOKEN_LENGTH),
                user_id,
                csrf_token: nanoid::nanoid!(TOKEN_LENGTH),
                expires_at,
            },
        )
        .await
    }
}

/// Run argon2 hashing on the blocking pool.
async fn hash_off_thread(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| Error::Internal(format!("Password hashing task failed: {}", e)))?
}

async fn verify_off_thread(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| Error::Internal(format!("Password verification task failed: {}", e)))
}

/// Hash a password into an argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))
}

/// Check a password against a stored PHC string. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
