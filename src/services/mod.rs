//! Service layer for the diary.
//!
//! Contains the business logic between the HTTP handlers and the store:
//! - Auth (registration, login, sessions, password change)
//! - Journal (entry lifecycle, categories and search)
//! - Templates (prefilled starting points for new entries)
//! - Stats (aggregates over a user's entries)
//! - Export (JSON and plain-text downloads)

mod auth;
pub mod export;
mod journal;
pub mod stats;
mod templates;

pub use auth::{hash_password, verify_password, AuthService, LoginResult};
pub use export::ExportFormat;
pub use journal::{ExportFile, JournalService};
pub use stats::EntryStats;
pub use templates::TemplateService;
