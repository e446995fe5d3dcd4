//! Error types for the diary service.
//!
//! Uses thiserror for ergonomic error definitions that integrate
//! with axum's response system. Errors render as an HTML page; the
//! `negotiate_errors` middleware swaps in a JSON body for clients that
//! asked for JSON.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::views;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Auth errors
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid or missing CSRF token")]
    InvalidCsrfToken,

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    // Rate limiting
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    // Store errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error details attached to every error response so later layers can
/// re-render it.
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 401
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,

            // 403
            Self::InvalidCsrfToken => StatusCode::FORBIDDEN,

            // 404
            Self::NotFound(_) => StatusCode::NOT_FOUND,

            // 409
            Self::AlreadyExists(_) => StatusCode::CONFLICT,

            // 400
            Self::Validation(_) | Self::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,

            // 429
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,

            // 503
            Self::Database(_) => StatusCode::SERVICE_UNAVAILABLE,

            // 500
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidCsrfToken => "INVALID_CSRF_TOKEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::Database(_) => "SERVICE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to the client. Store and internal failures are
    /// logged here and replaced by a generic text.
    pub fn public_message(&self) -> String {
        match self {
            Self::Database(e) => {
                tracing::error!(error = %e, "Store failure");
                "The service is temporarily unavailable. Please try again later.".to_string()
            }
            Self::Internal(_) => {
                tracing::error!(error = %self, "Internal failure");
                "An unexpected error occurred.".to_string()
            }
            Self::Validation(msg) | Self::AlreadyExists(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// Status, code and public message of this error.
    pub fn info(&self) -> ErrorInfo {
        ErrorInfo {
            status: self.status_code(),
            code: self.error_code(),
            message: self.public_message(),
        }
    }

    /// Errors a user can fix by correcting and resubmitting a form.
    pub fn is_form_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::AlreadyExists(_)
                | Self::InvalidCredentials
                | Self::RateLimitExceeded
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let info = self.info();

        let mut response = match self {
            // Browsers are sent to the login form rather than shown a 401.
            Self::Unauthenticated => Redirect::to("/login").into_response(),
            _ => (info.status, Html(views::error_page(info.status, &info.message))).into_response(),
        };

        response.extensions_mut().insert(info);
        response
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}
