//! Export Routes
//!
//! Routes:
//! - GET /export?format=json|txt - Download every entry, oldest first

use axum::{
    extract::{Extension, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::middleware::SessionUser;
use crate::{AppState, Result};

pub fn routes() -> Router<AppState> {
    Router::new().route("/export", get(export))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "txt".to_string()
}

async fn export(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse> {
    let file = state.journal.export(user.user_id, &query.format).await?;

    Ok((
        [
            (CONTENT_TYPE, file.content_type.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename={}", file.filename),
            ),
        ],
        file.body,
    ))
}
