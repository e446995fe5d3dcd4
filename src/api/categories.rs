//! Category Routes
//!
//! Routes:
//! - GET /categories              - List (HTML, or JSON with `Accept: application/json`)
//! - POST /categories             - Create category
//! - POST /categories/:id/delete  - Delete category; its entries become uncategorized

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
use crate::models::CategoryInput;
use crate::{views, AppState, Result};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:id/delete", post(delete_category))
}

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

async fn list_categories(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    headers: HeaderMap,
) -> Result<Response> {
    let categories = state.journal.list_categories(user.user_id).await?;

    if wants_json(&headers) {
        return Ok(Json(categories).into_response());
    }
    Ok(Html(views::categories_page(&user, &categories, &CategoryInput::default(), None)).into_response())
}

async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    user.verify_csrf(&form.csrf_token)?;
    let input = CategoryInput {
        name: form.name,
        color: form.color,
    };

    match state.journal.create_category(user.user_id, &input).await {
        Ok(_) => Ok(Redirect::to("/categories").into_response()),
        Err(e) => {
            let categories = state.journal.list_categories(user.user_id).await?;
            Ok(form_error(e, |message| {
                views::categories_page(&user, &categories, &input, Some(message))
            }))
        }
    }
}

async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect> {
    user.verify_csrf(&form.csrf_token)?;
    state.journal.delete_category(user.user_id, id).await?;
    Ok(Redirect::to("/categories"))
}
