//! HTTP routes for the diary.
//!
//! Route groups:
//! - `status` - health check
//! - `auth` - landing page, registration, login, logout, password change
//! - `entries` - entry CRUD, search and favorites (session required)
//! - `categories` - per-user categories (session required)
//! - `templates` - entry templates (session required)
//! - `stats` - statistics page (session required)
//! - `export` - JSON / text download (session required)

mod auth;
mod categories;
mod entries;
mod export;
mod stats;
pub mod status;
mod templates;

use axum::{
    middleware,
    response::{Html, IntoResponse, Response},
    Router,
};

use crate::middleware::{negotiate_errors, require_session};
use crate::{AppState, Error};

/// Build all routes.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(status::routes())
        .merge(auth::routes(state.clone()))
        .merge(protected_routes(state))
}

/// Routes that touch entries and require a session.
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(entries::routes())
        .merge(categories::routes())
        .merge(templates::routes())
        .merge(stats::routes())
        .merge(export::routes())
        .layer(middleware::from_fn_with_state(state, require_session))
}

/// Complete application router with error negotiation, ready to serve.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes(state.clone()))
        .layer(middleware::from_fn(negotiate_errors))
        .with_state(state)
}

/// Re-render a form with the error message when the user can fix it,
/// otherwise fall through to the regular error response.
fn form_error(err: Error, render: impl FnOnce(&str) -> String) -> Response {
    if !err.is_form_error() {
        return err.into_response();
    }

    let info = err.info();
    let mut response = (info.status, Html(render(&info.message))).into_response();
    response.extensions_mut().insert(info);
    response
}
