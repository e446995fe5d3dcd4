//! Entry template database queries, scoped by owner.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::models::{db_timestamp, EntryTemplate, Mood, TemplateDraft};
use crate::{Error, Result};

use super::DbPool;

const TEMPLATE_SELECT: &str = r#"
    SELECT id, user_id, category_id, name, body, mood, weather, location, tags,
           is_default, created_at
    FROM entry_templates
"#;

#[derive(Debug, Clone, FromRow)]
struct TemplateRow {
    id: i64,
    user_id: i64,
    category_id: Option<i64>,
    name: String,
    body: String,
    mood: Option<String>,
    weather: Option<String>,
    location: Option<String>,
    tags: String,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl From<TemplateRow> for EntryTemplate {
    fn from(row: TemplateRow) -> Self {
        EntryTemplate {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            body: row.body,
            category_id: row.category_id,
            mood: row.mood.as_deref().and_then(Mood::from_str),
            weather: row.weather,
            location: row.location,
            tags: serde_json::from_str(&row.tags).unwrap_or_default(),
            is_default: row.is_default,
            created_at: row.created_at,
        }
    }
}

fn not_found(id: i64) -> Error {
    Error::NotFound(format!("Template {}", id))
}

/// Create a template. A new default replaces the previous one.
pub async fn create_template(pool: &DbPool, user_id: i64, draft: &TemplateDraft) -> Result<EntryTemplate> {
    let tags = serde_json::to_string(&draft.tags)?;
    let mut tx = pool.begin().await?;

    if draft.is_default {
        sqlx::query("UPDATE entry_templates SET is_default = 0 WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO entry_templates (user_id, category_id, name, body, mood, weather, location,
                                     tags, is_default, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(draft.category_id)
    .bind(&draft.name)
    .bind(&draft.body)
    .bind(draft.mood.map(|m| m.as_str()))
    .bind(&draft.weather)
    .bind(&draft.location)
    .bind(&tags)
    .bind(draft.is_default)
    .bind(db_timestamp(Utc::now()))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    get_template(pool, user_id, id).await
}

/// Templates of `user_id`, default first, then by name.
pub async fn list_templates(pool: &DbPool, user_id: i64) -> Result<Vec<EntryTemplate>> {
    let sql = format!("{TEMPLATE_SELECT} WHERE user_id = ? ORDER BY is_default DESC, name, id");
    let rows = sqlx::query_as::<_, TemplateRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(EntryTemplate::from).collect())
}

pub async fn get_template(pool: &DbPool, user_id: i64, id: i64) -> Result<EntryTemplate> {
    let sql = format!("{TEMPLATE_SELECT} WHERE id = ? AND user_id = ?");
    sqlx::query_as::<_, TemplateRow>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .map(EntryTemplate::from)
        .ok_or_else(|| not_found(id))
}

pub async fn get_default_template(pool: &DbPool, user_id: i64) -> Result<Option<EntryTemplate>> {
    let sql = format!("{TEMPLATE_SELECT} WHERE user_id = ? AND is_default = 1 LIMIT 1");
    let row = sqlx::query_as::<_, TemplateRow>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(EntryTemplate::from))
}

pub async fn delete_template(pool: &DbPool, user_id: i64, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM entry_templates WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}
