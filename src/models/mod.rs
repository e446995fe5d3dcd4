//! Data models for the diary service.
//!
//! Defines users, sessions, entries, categories, templates and the search
//! filter, together with the validation rules applied to user input.

mod category;
mod entry;
mod filter;
mod template;
mod user;

pub use category::*;
pub use entry::*;
pub use filter::*;
pub use template::*;
pub use user::*;

use chrono::{DateTime, SecondsFormat, Utc};

/// Current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Fixed-width RFC 3339 text used for every stored timestamp, so that
/// string comparison in SQL matches chronological order.
pub fn db_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}
