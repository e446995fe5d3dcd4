//! Template service: reusable starting points for new entries.

use tracing::info;

use crate::config::EntryLimits;
use crate::db::{self, DbPool};
use crate::error::Result;
use crate::models::{EntryTemplate, TemplateInput};

use super::journal::check_category;

/// Service for entry template operations.
#[derive(Clone)]
pub struct TemplateService {
    db: DbPool,
    limits: EntryLimits,
}

impl TemplateService {
    pub fn new(db: DbPool, limits: EntryLimits) -> Self {
        Self { db, limits }
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<EntryTemplate>> {
        db::list_templates(&self.db, user_id).await
    }

    pub async fn create(&self, user_id: i64, input: &TemplateInput) -> Result<EntryTemplate> {
        let draft = input.validate(&self.limits)?;
        check_category(&self.db, user_id, draft.category_id).await?;

        let template = db::create_template(&self.db, user_id, &draft).await?;
        info!(user_id, template_id = template.id, default = template.is_default, "Template created");
        Ok(template)
    }

    pub async fn get(&self, user_id: i64, id: i64) -> Result<EntryTemplate> {
        db::get_template(&self.db, user_id, id).await
    }

    /// Template that prefills the new-entry form, if the user marked one.
    pub async fn default_for(&self, user_id: i64) -> Result<Option<EntryTemplate>> {
        db::get_default_template(&self.db, user_id).await
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<()> {
        db::delete_template(&self.db, user_id, id).await?;
        info!(user_id, template_id = id, "Template deleted");
        Ok(())
    }
}
