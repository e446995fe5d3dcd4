//! Diary entry database queries.
//!
//! Every query is scoped by the owning user: an entry owned by someone
//! else behaves exactly like an entry that does not exist.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use crate::models::{db_timestamp, fold_case, Entry, EntryDraft, EntryFilter, Mood};
use crate::{Error, Result};

use super::DbPool;

/// Entry columns, the category name, and the tag set folded into a JSON array.
const ENTRY_SELECT: &str = r#"
    SELECT e.id, e.user_id, e.category_id, c.name AS category, e.title, e.body,
           e.mood, e.weather, e.location, e.is_favorite, e.word_count,
           e.created_at, e.updated_at,
           (SELECT json_group_array(t.tag) FROM entry_tags t WHERE t.entry_id = e.id) AS tags
    FROM entries e
    LEFT JOIN categories c ON c.id = e.category_id
"#;

/// Entry row as stored.
#[derive(Debug, Clone, FromRow)]
struct EntryRow {
    id: i64,
    user_id: i64,
    category_id: Option<i64>,
    category: Option<String>,
    title: Option<String>,
    body: String,
    mood: Option<String>,
    weather: Option<String>,
    location: Option<String>,
    is_favorite: bool,
    word_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    tags: String,
}

impl From<EntryRow> for Entry {
    fn from(row: EntryRow) -> Self {
        let mut tags: Vec<String> = serde_json::from_str(&row.tags).unwrap_or_default();
        tags.sort();

        Entry {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            category_id: row.category_id,
            category: row.category,
            title: row.title,
            mood: row.mood.as_deref().and_then(Mood::from_str),
            weather: row.weather,
            location: row.location,
            tags,
            body: row.body,
            is_favorite: row.is_favorite,
            word_count: row.word_count,
        }
    }
}

fn not_found(id: i64) -> Error {
    Error::NotFound(format!("Entry {}", id))
}

/// Escape LIKE wildcards and wrap the keyword for a substring match.
fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

async fn insert_tags(conn: &mut SqliteConnection, entry_id: i64, tags: &[String]) -> Result<()> {
    for tag in tags {
        sqlx::query("INSERT OR IGNORE INTO entry_tags (entry_id, tag) VALUES (?, ?)")
            .bind(entry_id)
            .bind(tag)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

// ============================================================================
// Entry Queries
// ============================================================================

/// Create an entry and its tags in one transaction.
pub async fn create_entry(
    pool: &DbPool,
    user_id: i64,
    draft: &EntryDraft,
    created_at: DateTime<Utc>,
) -> Result<Entry> {
    let stamp = db_timestamp(created_at);
    let mut tx = pool.begin().await?;

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO entries (user_id, category_id, title, body, body_folded, mood, weather,
                             location, location_folded, word_count, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(draft.category_id)
    .bind(&draft.title)
    .bind(&draft.body)
    .bind(fold_case(&draft.body))
    .bind(draft.mood.map(|m| m.as_str()))
    .bind(&draft.weather)
    .bind(&draft.location)
    .bind(draft.location.as_deref().map(fold_case))
    .bind(draft.word_count)
    .bind(&stamp)
    .bind(&stamp)
    .fetch_one(&mut *tx)
    .await?;

    insert_tags(&mut tx, id, &draft.tags).await?;
    tx.commit().await?;

    get_entry(pool, user_id, id).await
}

/// Get an entry owned by `user_id`.
pub async fn get_entry(pool: &DbPool, user_id: i64, id: i64) -> Result<Entry> {
    let mut qb = QueryBuilder::<Sqlite>::new(ENTRY_SELECT);
    qb.push(" WHERE e.id = ")
        .push_bind(id)
        .push(" AND e.user_id = ")
        .push_bind(user_id);

    qb.build_query_as::<EntryRow>()
        .fetch_optional(pool)
        .await?
        .map(Entry::from)
        .ok_or_else(|| not_found(id))
}

/// Replace an entry's content and tags. `created_at` is left untouched.
pub async fn update_entry(pool: &DbPool, user_id: i64, id: i64, draft: &EntryDraft) -> Result<Entry> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE entries
        SET category_id = ?, title = ?, body = ?, body_folded = ?, mood = ?, weather = ?,
            location = ?, location_folded = ?, word_count = ?, updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(draft.category_id)
    .bind(&draft.title)
    .bind(&draft.body)
    .bind(fold_case(&draft.body))
    .bind(draft.mood.map(|m| m.as_str()))
    .bind(&draft.weather)
    .bind(&draft.location)
    .bind(draft.location.as_deref().map(fold_case))
    .bind(draft.word_count)
    .bind(db_timestamp(Utc::now()))
    .bind(id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    sqlx::query("DELETE FROM entry_tags WHERE entry_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_tags(&mut tx, id, &draft.tags).await?;
    tx.commit().await?;

    get_entry(pool, user_id, id).await
}

/// Delete an entry. Tags go with it via ON DELETE CASCADE.
pub async fn delete_entry(pool: &DbPool, user_id: i64, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM entries WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    Ok(())
}

/// Flip the favorite flag and return its new value.
pub async fn toggle_favorite(pool: &DbPool, user_id: i64, id: i64) -> Result<bool> {
    let row: Option<(bool,)> = sqlx::query_as(
        r#"
        UPDATE entries SET is_favorite = NOT is_favorite
        WHERE id = ? AND user_id = ?
        RETURNING is_favorite
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.map(|(fav,)| fav).ok_or_else(|| not_found(id))
}

/// Entries of `user_id` matching every predicate of `filter`, newest
/// first with ties broken by descending id.
pub async fn search_entries(pool: &DbPool, user_id: i64, filter: &EntryFilter) -> Result<Vec<Entry>> {
    let mut qb = QueryBuilder::<Sqlite>::new(ENTRY_SELECT);
    qb.push(" WHERE e.user_id = ").push_bind(user_id);

    if let Some(from) = filter.created_from() {
        qb.push(" AND e.created_at >= ").push_bind(db_timestamp(from));
    }
    if let Some(before) = filter.created_before() {
        qb.push(" AND e.created_at < ").push_bind(db_timestamp(before));
    }
    if let Some(keyword) = &filter.keyword {
        // Both sides are folded in Rust; SQLite's LIKE only folds ASCII.
        let pattern = like_pattern(&fold_case(keyword));
        qb.push(" AND (e.body_folded LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR e.location_folded LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
    if let Some(mood) = filter.mood {
        qb.push(" AND e.mood = ").push_bind(mood.as_str());
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND e.category_id = ").push_bind(category_id);
    }
    if let Some(tag) = &filter.tag {
        qb.push(" AND EXISTS (SELECT 1 FROM entry_tags ft WHERE ft.entry_id = e.id AND ft.tag = ")
            .push_bind(tag.clone())
            .push(")");
    }

    qb.push(" ORDER BY e.created_at DESC, e.id DESC");

    let rows = qb.build_query_as::<EntryRow>().fetch_all(pool).await?;
    Ok(rows.into_iter().map(Entry::from).collect())
}

/// All entries of `user_id`, oldest first.
pub async fn list_entries_chronological(pool: &DbPool, user_id: i64) -> Result<Vec<Entry>> {
    let mut qb = QueryBuilder::<Sqlite>::new(ENTRY_SELECT);
    qb.push(" WHERE e.user_id = ")
        .push_bind(user_id)
        .push(" ORDER BY e.created_at ASC, e.id ASC");

    let rows = qb.build_query_as::<EntryRow>().fetch_all(pool).await?;
    Ok(rows.into_iter().map(Entry::from).collect())
}
