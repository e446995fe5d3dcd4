//! CSRF protection for forms shown before login.
//!
//! Login and registration have no session yet, so they use a
//! double-submit cookie: the form's hidden `csrf_token` field must equal
//! the `diary_csrf` cookie. Authenticated forms use the session's token
//! instead (see `SessionUser::verify_csrf`).

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;

use crate::{Error, Result};

/// Anonymous CSRF cookie name.
pub const CSRF_COOKIE_NAME: &str = "diary_csrf";

const TOKEN_LENGTH: usize = 32;

/// Return the jar's anonymous token, minting and storing a new one if absent.
pub fn ensure_form_token(jar: CookieJar, secure: bool) -> (CookieJar, String) {
    if let Some(existing) = jar.get(CSRF_COOKIE_NAME).map(|c| c.value().to_string()) {
        if existing.len() == TOKEN_LENGTH {
            return (jar, existing);
        }
    }

    let token = nanoid::nanoid!(TOKEN_LENGTH);
    let cookie = Cookie::build((CSRF_COOKIE_NAME, token.clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .build();
    (jar.add(cookie), token)
}

/// Check a submitted anonymous form token against the cookie.
pub fn verify_form_token(jar: &CookieJar, submitted: &str) -> Result<()> {
    let expected = jar
        .get(CSRF_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .ok_or(Error::InvalidCsrfToken)?;

    if submitted.is_empty() || !constant_time_eq(submitted, &expected) {
        tracing::warn!("Anonymous CSRF token mismatch");
        return Err(Error::InvalidCsrfToken);
    }
    Ok(())
}

/// Compare two tokens without short-circuiting on the first difference.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
    }

    #[test]
    fn test_token_is_reused_once_issued() {
        let (jar, first) = ensure_form_token(CookieJar::new(), false);
        assert_eq!(first.len(), TOKEN_LENGTH);

        let (jar, second) = ensure_form_token(jar, false);
        assert_eq!(first, second);

        assert!(verify_form_token(&jar, &first).is_ok());
        assert!(matches!(verify_form_token(&jar, "forged"), Err(Error::InvalidCsrfToken)));
        assert!(matches!(verify_form_token(&jar, ""), Err(Error::InvalidCsrfToken)));
    }

    #[test]
    fn test_missing_cookie_is_rejected() {
        assert!(matches!(
            verify_form_token(&CookieJar::new(), &"x".repeat(32)),
            Err(Error::InvalidCsrfToken)
        ));
    }
}
