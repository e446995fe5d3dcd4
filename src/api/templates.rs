//! Template Routes
//!
//! Routes:
//! - GET /templates              - List and creation form (HTML / JSON)
//! - POST /templates             - Create template
//! - GET /templates/:id/use      - New entry form prefilled from the template
//! - POST /templates/:id/delete  - Delete template

use axum::{
    extract::{Extension, Path, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;

use super::entries::CsrfForm;
use super::form_error;
use crate::middleware::{wants_json, SessionUser};
use crate::models::{EntryInput, TemplateInput};
use crate::views::{self, EntryFormMode};
use crate::{AppState, Result};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/templates", get(list_templates).post(create_template))
        .route("/templates/:id/use", get(use_template))
        .route("/templates/:id/delete", post(delete_template))
}

/// Template form fields plus the session's CSRF token.
#[derive(Debug, Deserialize)]
pub struct TemplateForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub is_default: Option<String>,
}

impl TemplateForm {
    fn into_parts(self) -> (String, TemplateInput) {
        (
            self.csrf_token,
            TemplateInput {
                name: self.name,
                body: self.body,
                category_id: self.category_id,
                mood: self.mood,
                weather: self.weather,
                location: self.location,
                tags: self.tags,
                is_default: self.is_default,
            },
        )
    }
}

async fn list_templates(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    headers: HeaderMap,
) -> Result<Response> {
    let templates = state.templates.list(user.user_id).await?;

    if wants_json(&headers) {
        return Ok(Json(templates).into_response());
    }
    let categories = state.journal.list_categories(user.user_id).await?;
    Ok(Html(views::templates_page(
        &user,
        &templates,
        &categories,
        &TemplateInput::default(),
        None,
    ))
    .into_response())
}

async fn create_template(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Form(form): Form<TemplateForm>,
) -> Result<Response> {
    let (csrf_token, input) = form.into_parts();
    user.verify_csrf(&csrf_token)?;

    match state.templates.create(user.user_id, &input).await {
        Ok(_) => Ok(Redirect::to("/templates").into_response()),
        Err(e) => {
            let templates = state.templates.list(user.user_id).await?;
            let categories = state.journal.list_categories(user.user_id).await?;
            Ok(form_error(e, |message| {
                views::templates_page(&user, &templates, &categories, &input, Some(message))
            }))
        }
    }
}

async fn use_template(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
) -> Result<Html<String>> {
    let template = state.templates.get(user.user_id, id).await?;
    let categories = state.journal.list_categories(user.user_id).await?;

    Ok(Html(views::entry_form_page(
        &user,
        EntryFormMode::Create,
        &EntryInput::from(&template),
        &categories,
        None,
    )))
}

async fn delete_template(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect> {
    user.verify_csrf(&form.csrf_token)?;
    state.templates.delete(user.user_id, id).await?;
    Ok(Redirect::to("/templates"))
}
