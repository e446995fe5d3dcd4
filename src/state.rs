//! Application state for the diary.
//!
//! Contains the shared state that is passed to all handlers.

use crate::config::{self, Config, SessionConfig};
use crate::db::DbPool;
use crate::services::{AuthService, JournalService, TemplateService};
use crate::Result;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DbPool,
    /// Authentication service.
    pub auth: AuthService,
    /// Diary entry service.
    pub journal: JournalService,
    /// Entry template service.
    pub templates: TemplateService,
    /// Cookie settings.
    pub session: SessionConfig,
}

impl AppState {
    /// Create a new application state from the global configuration.
    pub async fn new() -> Result<Self> {
        let config = config::config();

        // Initialize database
        let db = crate::db::init_pool(&config.database.path).await?;

        // Initialize database schema
        crate::db::initialize_schema(&db).await?;

        Self::with_pool(db, config)
    }

    /// Build the state around an existing pool.
    pub fn with_pool(db: DbPool, config: &Config) -> Result<Self> {
        let auth = AuthService::new(db.clone(), &config.session, &config.rate_limit)?;
        let journal = JournalService::new(db.clone(), config.entries.clone());
        let templates = TemplateService::new(db.clone(), config.entries.clone());

        Ok(Self {
            db,
            auth,
            journal,
            templates,
            session: config.session.clone(),
        })
    }
}
