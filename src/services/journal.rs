//! Journal service: entry lifecycle, search, statistics and export.
//!
//! Every operation takes the owning user's id and never reaches entries
//! of another user.

use chrono::Utc;
use tracing::{debug, info};

use crate::config::EntryLimits;
use crate::db::{self, DbPool};
use crate::error::{Error, Result};
use crate::models::{now, Category, CategoryInput, Entry, EntryFilter, EntryInput};

use super::export::ExportFormat;
use super::stats::EntryStats;

/// A rendered export ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub entry_count: usize,
}

/// Service for diary entry operations.
#[derive(Clone)]
pub struct JournalService {
    db: DbPool,
    limits: EntryLimits,
}

impl JournalService {
    /// Create a new journal service.
    pub fn new(db: DbPool, limits: EntryLimits) -> Self {
        Self { db, limits }
    }

    /// Entries matching `filter`, newest first.
    pub async fn search(&self, user_id: i64, filter: &EntryFilter) -> Result<Vec<Entry>> {
        filter.validate()?;
        let entries = db::search_entries(&self.db, user_id, filter).await?;
        debug!(user_id, results = entries.len(), "Entry search");
        Ok(entries)
    }

    pub async fn get(&self, user_id: i64, id: i64) -> Result<Entry> {
        db::get_entry(&self.db, user_id, id).await
    }

    pub async fn create(&self, user_id: i64, input: &EntryInput) -> Result<Entry> {
        let draft = input.validate(&self.limits)?;
        check_category(&self.db, user_id, draft.category_id).await?;
        let entry = db::create_entry(&self.db, user_id, &draft, now()).await?;
        info!(user_id, entry_id = entry.id, words = entry.word_count, "Entry created");
        Ok(entry)
    }

    pub async fn update(&self, user_id: i64, id: i64, input: &EntryInput) -> Result<Entry> {
        let draft = input.validate(&self.limits)?;
        check_category(&self.db, user_id, draft.category_id).await?;
        let entry = db::update_entry(&self.db, user_id, id, &draft).await?;
        info!(user_id, entry_id = entry.id, "Entry updated");
        Ok(entry)
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<()> {
        db::delete_entry(&self.db, user_id, id).await?;
        info!(user_id, entry_id = id, "Entry deleted");
        Ok(())
    }

    /// Flip the pin flag; returns the new value.
    pub async fn toggle_favorite(&self, user_id: i64, id: i64) -> Result<bool> {
        let favorite = db::toggle_favorite(&self.db, user_id, id).await?;
        debug!(user_id, entry_id = id, favorite, "Entry favorite toggled");
        Ok(favorite)
    }

    pub async fn list_categories(&self, user_id: i64) -> Result<Vec<Category>> {
        db::list_categories(&self.db, user_id).await
    }

    pub async fn create_category(&self, user_id: i64, input: &CategoryInput) -> Result<Category> {
        let draft = input.validate(self.limits.max_category_chars)?;
        let category = db::create_category(&self.db, user_id, &draft).await?;
        info!(user_id, category_id = category.id, "Category created");
        Ok(category)
    }

    /// Delete a category; its entries stay, uncategorized.
    pub async fn delete_category(&self, user_id: i64, id: i64) -> Result<()> {
        db::delete_category(&self.db, user_id, id).await?;
        info!(user_id, category_id = id, "Category deleted");
        Ok(())
    }

    pub async fn stats(&self, user_id: i64) -> Result<EntryStats> {
        let entries = db::list_entries_chronological(&self.db, user_id).await?;
        Ok(EntryStats::from_entries(&entries, Utc::now().date_naive()))
    }

    /// Export every entry of the user, oldest first. The format name is
    /// checked before the store is read.
    pub async fn export(&self, user_id: i64, format: &str) -> Result<ExportFile> {
        let format = ExportFormat::parse(format)?;
        let entries = db::list_entries_chronological(&self.db, user_id).await?;
        let body = format.render(&entries)?;

        info!(user_id, entries = entries.len(), format = format.extension(), "Entries exported");

        Ok(ExportFile {
            filename: format.filename(Utc::now().date_naive()),
            content_type: format.content_type(),
            body,
            entry_count: entries.len(),
        })
    }
}

/// Reject a category id that does not belong to the user.
pub(crate) async fn check_category(db: &DbPool, user_id: i64, category_id: Option<i64>) -> Result<()> {
    let Some(id) = category_id else {
        return Ok(());
    };
    match db::get_category(db, user_id, id).await {
        Ok(_) => Ok(()),
        Err(Error::NotFound(_)) => Err(Error::Validation("Unknown category".into())),
        Err(e) => Err(e),
    }
}
