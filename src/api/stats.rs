//! Statistics Routes
//!
//! Routes:
//! - GET /stats - Statistics page (HTML, or JSON with `Accept: application/json`)

use axum::{
    extract::{Extension, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::middleware::{wants_json, SessionUser};
use crate::{views, AppState, Result};

pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(stats))
}

async fn stats(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    headers: HeaderMap,
) -> Result<Response> {
    let stats = state.journal.stats(user.user_id).await?;

    if wants_json(&headers) {
        return Ok(Json(stats).into_response());
    }
    Ok(Html(views::stats_page(&user, &stats)).into_response())
}
