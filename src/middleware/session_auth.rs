//! Session-based authentication middleware.
//!
//! Validates the session cookie on every entry-touching route.
//!
//! # Session Flow
//!
//! 1. User logs in with username and password
//! 2. Server creates session and sets `diary_session` cookie
//! 3. Subsequent requests include cookie, validated by this middleware
//! 4. Session expires after configured duration or on logout
//!
//! # Security Model
//!
//! - Session IDs are cryptographically random (nanoid)
//! - Sessions are stored server-side in database
//! - Cookie is HttpOnly, Secure (in production), SameSite=Lax
//! - Each session carries its own CSRF token for authenticated forms

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use chrono::Utc;

use super::csrf::constant_time_eq;
use crate::{db, error::Error, AppState, Result};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "diary_session";

/// User context injected into request extensions after successful session validation.
#[derive(Clone, Debug)]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
    pub session_id: String,
    /// Token every authenticated form must echo back.
    pub csrf_token: String,
}

impl SessionUser {
    /// Check a submitted form token against the session's token.
    pub fn verify_csrf(&self, submitted: &str) -> Result<()> {
        if submitted.is_empty() || !constant_time_eq(submitted, &self.csrf_token) {
            tracing::warn!(user_id = self.user_id, "CSRF token mismatch");
            return Err(Error::InvalidCsrfToken);
        }
        Ok(())
    }
}

/// Build the session cookie.
pub fn session_cookie(session_id: String, max_age: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, session_id))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age.num_seconds()))
        .build()
}

/// Cookie that clears the session cookie in the browser.
pub fn session_removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME).path("/").build()
}

/// Middleware that requires a valid session.
///
/// Extracts session ID from cookie, validates it against the database,
/// and injects `SessionUser` into request extensions.
///
/// # Errors
///
/// Returns `Error::Unauthenticated` (a redirect to `/login`) if:
/// - No session cookie present
/// - Session not found in database
/// - Session is expired
/// - User not found
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, middleware};
/// use diary::middleware::require_session;
///
/// let app = Router::new()
///     .route("/entries", get(list_entries))
///     .layer(middleware::from_fn_with_state(state.clone(), require_session));
/// ```
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response> {
    // Extract session ID from cookie
    let session_id = jar
        .get(SESSION_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .ok_or(Error::Unauthenticated)?;

    // Validate session and get user
    let (session_user, extended) = validate_session(&state, &session_id).await?;

    // Inject SessionUser into request extensions
    req.extensions_mut().insert(session_user);

    let response = next.run(req).await;

    // Refresh the browser cookie alongside an extended session, unless the
    // handler already set or cleared it.
    if extended && !sets_session_cookie(&response) {
        let cookie = session_cookie(
            session_id,
            state.auth.session_max_age(),
            state.session.cookie_secure,
        );
        return Ok((jar.add(cookie), response).into_response());
    }

    Ok(response)
}

/// Optional session middleware - doesn't fail if no session, just doesn't inject user.
///
/// Used by pages that look different for signed-in users, such as the
/// landing page.
pub async fn optional_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Try to extract and validate session
    if let Some(session_id) = jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_string()) {
        if let Ok((session_user, _)) = validate_session(&state, &session_id).await {
            req.extensions_mut().insert(session_user);
        }
    }

    next.run(req).await
}

/// Validate a session ID and return the session user, plus whether the
/// session was extended.
async fn validate_session(state: &AppState, session_id: &str) -> Result<(SessionUser, bool)> {
    // Expired sessions are removed by the lookup itself
    let (session, user) = db::get_session_with_user(&state.db, session_id)
        .await?
        .ok_or(Error::Unauthenticated)?;

    // Extend the session once it is more than halfway through its lifetime
    let max_age = state.auth.session_max_age();
    let halfway = Utc::now() + (max_age / 2);
    let extended = session.expires_at < halfway;

    if extended {
        let new_expires = Utc::now() + max_age;
        let db = state.db.clone();
        let sid = session.id.clone();
        tokio::spawn(async move {
            if let Err(e) = db::extend_session(&db, &sid, new_expires).await {
                tracing::warn!(error = %e, "Failed to extend session");
            }
        });
    }

    Ok((
        SessionUser {
            user_id: user.id,
            username: user.username,
            session_id: session.id,
            csrf_token: session.csrf_token,
        },
        extended,
    ))
}

fn sets_session_cookie(response: &Response) -> bool {
    let prefix = format!("{}=", SESSION_COOKIE_NAME);
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .any(|v| v.to_str().map(|s| s.starts_with(&prefix)).unwrap_or(false))
}
