//! Middleware for the diary.
//!
//! - `session_auth` - Session/cookie validation for every entry-touching route
//! - `csrf` - Double-submit tokens for the anonymous login and register forms
//! - `negotiate_errors` - JSON error bodies for clients that ask for JSON

mod csrf;
mod session_auth;

pub use csrf::{constant_time_eq, ensure_form_token, verify_form_token, CSRF_COOKIE_NAME};
pub use session_auth::{
    optional_session, require_session, session_cookie, session_removal_cookie, SessionUser,
    SESSION_COOKIE_NAME,
};

use axum::{
    body::Body,
    extract::Request,
    http::{header::ACCEPT, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::ErrorInfo;

/// Whether the client prefers a JSON response.
pub fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("application/json"))
        .unwrap_or(false)
}

/// Middleware that re-renders error responses as JSON for JSON clients.
///
/// Error responses carry an `ErrorInfo` extension; when the request's
/// `Accept` header asks for JSON the HTML body (or login redirect) is
/// replaced by `{"error": {"code", "message"}}` with the real status.
pub async fn negotiate_errors(req: Request<Body>, next: Next) -> Response {
    let json = wants_json(req.headers());
    let response = next.run(req).await;

    if !json {
        return response;
    }

    let Some(info) = response.extensions().get::<ErrorInfo>().cloned() else {
        return response;
    };

    let mut rendered = (
        info.status,
        Json(json!({
            "error": {
                "code": info.code,
                "message": info.message,
            }
        })),
    )
        .into_response();
    rendered.extensions_mut().insert(info);
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_wants_json() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));

        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));
        assert!(!wants_json(&headers));

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        assert!(wants_json(&headers));
    }
}
