//! Category database queries, scoped by owner.

use chrono::Utc;

use crate::models::{db_timestamp, Category, CategoryDraft};
use crate::{Error, Result};

use super::DbPool;

fn not_found(id: i64) -> Error {
    Error::NotFound(format!("Category {}", id))
}

/// Create a category. Names are unique per user.
pub async fn create_category(pool: &DbPool, user_id: i64, draft: &CategoryDraft) -> Result<Category> {
    sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (user_id, name, color, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, user_id, name, color, created_at
        "#,
    )
    .bind(user_id)
    .bind(&draft.name)
    .bind(&draft.color)
    .bind(db_timestamp(Utc::now()))
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            Error::AlreadyExists("Category already exists".to_string())
        }
        _ => Error::Database(e),
    })
}

/// Categories of `user_id` ordered by name.
pub async fn list_categories(pool: &DbPool, user_id: i64) -> Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, user_id, name, color, created_at FROM categories WHERE user_id = ? ORDER BY name, id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

pub async fn get_category(pool: &DbPool, user_id: i64, id: i64) -> Result<Category> {
    sqlx::query_as::<_, Category>(
        "SELECT id, user_id, name, color, created_at FROM categories WHERE id = ? AND user_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(id))
}

/// Delete a category. Entries and templates using it become uncategorized.
pub async fn delete_category(pool: &DbPool, user_id: i64, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}
