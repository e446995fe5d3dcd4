//! Per-user entry categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{Error, Result};

/// Color given to a category created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#667eea";

/// Category record from the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// `#rrggbb`
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Category fields as submitted by the form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Validated category ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub color: String,
}

impl CategoryInput {
    pub fn validate(&self, max_name_chars: usize) -> Result<CategoryDraft> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Category name is required".into()));
        }
        if name.chars().count() > max_name_chars {
            return Err(Error::Validation(format!(
                "Category name is too long (maximum {} characters)",
                max_name_chars
            )));
        }

        let color = match self.color.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            None => DEFAULT_CATEGORY_COLOR.to_string(),
            Some(c) if is_hex_color(c) => c.to_ascii_lowercase(),
            Some(c) => {
                return Err(Error::Validation(format!(
                    "Invalid color '{}', expected #rrggbb",
                    c
                )))
            }
        };

        Ok(CategoryDraft {
            name: name.to_string(),
            color,
        })
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}
