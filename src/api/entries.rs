//! Entry Routes
//!
//! Every route runs behind `require_session` and only ever sees the
//! signed-in user's entries.
//!
//! Routes:
//! - GET /entries                - List and search (HTML, or JSON with `Accept: application/json`)
//! - POST /entries               - Create entry
//! - GET /entries/new            - New entry form, prefilled from the default template
//! - GET /entries/:id            - View entry (HTML / JSON)
//! - POST /entries/:id           - Update entry
//! - GET /entries/:id/edit       - Edit form
//! - POST /entries/:id/delete    - Delete entry
//! - POST /entries/:id/favorite  - Toggle pin

use axum::{
    extract::{Extension, Path, Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::form_error;
use crate::middleware::{wants_json, SessionUser};
use crate::models::{EntryFilter, EntryInput, FilterParams};
use crate::views::{self, EntryFormMode};
use crate::{AppState, Result};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/entries", get(list_entries).post(create_entry))
        .route("/entries/new", get(new_entry_form))
        .route("/entries/:id", get(show_entry).post(update_entry))
        .route("/entries/:id/edit", get(edit_entry_form))
        .route("/entries/:id/delete", post(delete_entry))
        .route("/entries/:id/favorite", post(toggle_favorite))
}

/// Entry form fields plus the session's CSRF token.
#[derive(Debug, Deserialize)]
pub struct EntryForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
}

impl EntryForm {
    fn into_parts(self) -> (String, EntryInput) {
        (
            self.csrf_token,
            EntryInput {
                title: self.title,
                body: self.body,
                mood: self.mood,
                weather: self.weather,
                location: self.location,
                tags: self.tags,
                category_id: self.category_id,
            },
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct CsrfForm {
    #[serde(default)]
    pub csrf_token: String,
}

async fn list_entries(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    headers: HeaderMap,
    Query(params): Query<FilterParams>,
) -> Result<Response> {
    let filter = EntryFilter::parse(&params)?;
    let entries = state.journal.search(user.user_id, &filter).await?;

    if wants_json(&headers) {
        return Ok(Json(entries).into_response());
    }
    let categories = state.journal.list_categories(user.user_id).await?;
    Ok(Html(views::entry_list_page(&user, &entries, &params, &categories)).into_response())
}

async fn new_entry_form(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> Result<Html<String>> {
    let prefill = state
        .templates
        .default_for(user.user_id)
        .await?
        .map(|template| EntryInput::from(&template))
        .unwrap_or_default();
    let categories = state.journal.list_categories(user.user_id).await?;

    Ok(Html(views::entry_form_page(
        &user,
        EntryFormMode::Create,
        &prefill,
        &categories,
        None,
    )))
}

async fn create_entry(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Form(form): Form<EntryForm>,
) -> Result<Response> {
    let (csrf_token, input) = form.into_parts();
    user.verify_csrf(&csrf_token)?;

    match state.journal.create(user.user_id, &input).await {
        Ok(entry) => Ok(Redirect::to(&format!("/entries/{}", entry.id)).into_response()),
        Err(e) => {
            let categories = state.journal.list_categories(user.user_id).await?;
            Ok(form_error(e, |message| {
                views::entry_form_page(&user, EntryFormMode::Create, &input, &categories, Some(message))
            }))
        }
    }
}

async fn show_entry(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Response> {
    let entry = state.journal.get(user.user_id, id).await?;

    if wants_json(&headers) {
        return Ok(Json(entry).into_response());
    }
    Ok(Html(views::entry_page(&user, &entry)).into_response())
}

async fn edit_entry_form(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
) -> Result<Html<String>> {
    let entry = state.journal.get(user.user_id, id).await?;
    let categories = state.journal.list_categories(user.user_id).await?;
    Ok(Html(views::entry_form_page(
        &user,
        EntryFormMode::Edit(entry.id),
        &EntryInput::from(&entry),
        &categories,
        None,
    )))
}

async fn update_entry(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
    Form(form): Form<EntryForm>,
) -> Result<Response> {
    let (csrf_token, input) = form.into_parts();
    user.verify_csrf(&csrf_token)?;

    match state.journal.update(user.user_id, id, &input).await {
        Ok(entry) => Ok(Redirect::to(&format!("/entries/{}", entry.id)).into_response()),
        Err(e) => {
            let categories = state.journal.list_categories(user.user_id).await?;
            Ok(form_error(e, |message| {
                views::entry_form_page(&user, EntryFormMode::Edit(id), &input, &categories, Some(message))
            }))
        }
    }
}

async fn delete_entry(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect> {
    user.verify_csrf(&form.csrf_token)?;
    state.journal.delete(user.user_id, id).await?;
    Ok(Redirect::to("/entries"))
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Form(form): Form<CsrfForm>,
) -> Result<Response> {
    user.verify_csrf(&form.csrf_token)?;
    let is_favorite = state.journal.toggle_favorite(user.user_id, id).await?;

    if wants_json(&headers) {
        return Ok(Json(json!({ "id": id, "is_favorite": is_favorite })).into_response());
    }
    Ok(Redirect::to(&format!("/entries/{}", id)).into_response())
}
