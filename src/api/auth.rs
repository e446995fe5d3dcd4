//! Authentication Routes
//!
//! Routes:
//! - GET /                  - Landing page, or redirect to /entries when signed in
//! - GET /register          - Registration form
//! - POST /register         - Create account and sign in
//! - GET /login             - Login form
//! - POST /login            - Start session
//! - POST /logout           - End session
//! - GET /account/password  - Password change form
//! - POST /account/password - Change password

use axum::{
    extract::{Extension, State},
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::form_error;
use crate::middleware::{
    ensure_form_token, optional_session, require_session, session_cookie, session_removal_cookie,
    verify_form_token, SessionUser,
};
use crate::{views, AppState, Result};

/// Build authentication routes.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(index).layer(middleware::from_fn_with_state(state.clone(), optional_session)),
        )
        // Public routes
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        // Protected routes (require session)
        .route(
            "/logout",
            post(logout).layer(middleware::from_fn_with_state(state.clone(), require_session)),
        )
        .route(
            "/account/password",
            get(password_form)
                .post(change_password)
                .layer(middleware::from_fn_with_state(state, require_session)),
        )
}

// ============================================================================
// Forms
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// A form with nothing but its CSRF token.
#[derive(Debug, Deserialize)]
pub struct CsrfForm {
    #[serde(default)]
    pub csrf_token: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn index(user: Option<Extension<SessionUser>>) -> Response {
    match user {
        Some(_) => Redirect::to("/entries").into_response(),
        None => Html(views::landing_page()).into_response(),
    }
}

async fn login_form(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let (jar, token) = ensure_form_token(jar, state.session.cookie_secure);
    (jar, Html(views::login_page(&token, "", None)))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    verify_form_token(&jar, &form.csrf_token)?;

    match state.auth.login(&form.username, &form.password).await {
        Ok(login) => {
            let cookie = session_cookie(
                login.session_id,
                state.auth.session_max_age(),
                state.session.cookie_secure,
            );
            Ok((jar.add(cookie), Redirect::to("/entries")).into_response())
        }
        Err(e) => Ok(form_error(e, |message| {
            views::login_page(&form.csrf_token, &form.username, Some(message))
        })),
    }
}

async fn register_form(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let (jar, token) = ensure_form_token(jar, state.session.cookie_secure);
    (jar, Html(views::register_page(&token, "", None)))
}

async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    verify_form_token(&jar, &form.csrf_token)?;

    let registered = state
        .auth
        .register(&form.username, &form.password, &form.confirm_password)
        .await;

    let user = match registered {
        Ok(user) => user,
        Err(e) => {
            return Ok(form_error(e, |message| {
                views::register_page(&form.csrf_token, &form.username, Some(message))
            }))
        }
    };

    // New accounts are signed in straight away.
    let login = state.auth.login(&user.username, &form.password).await?;
    let cookie = session_cookie(
        login.session_id,
        state.auth.session_max_age(),
        state.session.cookie_secure,
    );
    Ok((jar.add(cookie), Redirect::to("/entries")).into_response())
}

async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    jar: CookieJar,
    Form(form): Form<CsrfForm>,
) -> Result<Response> {
    user.verify_csrf(&form.csrf_token)?;
    state.auth.logout(&user.session_id).await?;

    tracing::info!(user_id = user.user_id, "User logged out");

    Ok((jar.remove(session_removal_cookie()), Redirect::to("/login")).into_response())
}

async fn password_form(Extension(user): Extension<SessionUser>) -> Html<String> {
    Html(views::password_page(&user, None, false))
}

async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Form(form): Form<PasswordForm>,
) -> Result<Response> {
    user.verify_csrf(&form.csrf_token)?;

    let changed = state
        .auth
        .change_password(
            user.user_id,
            &user.session_id,
            &form.current_password,
            &form.new_password,
            &form.confirm_password,
        )
        .await;

    match changed {
        Ok(()) => Ok(Html(views::password_page(&user, None, true)).into_response()),
        Err(e) => Ok(form_error(e, |message| views::password_page(&user, Some(message), false))),
    }
}
