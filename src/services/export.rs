//! Export of a user's entries as a downloadable file.

use std::fmt::{self, Write as _};

use chrono::NaiveDate;

use crate::models::Entry;
use crate::{Error, Result};

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Text,
}

impl ExportFormat {
    /// Parse a format name, ignoring case.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "txt" => Ok(Self::Text),
            _ => Err(Error::UnsupportedFormat(name.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "txt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Text => "text/plain; charset=utf-8",
        }
    }

    /// `diary_export_YYYYMMDD.<ext>`
    pub fn filename(&self, date: NaiveDate) -> String {
        format!("diary_export_{}.{}", date.format("%Y%m%d"), self.extension())
    }

    /// Render entries, which must already be in export order.
    pub fn render(&self, entries: &[Entry]) -> Result<Vec<u8>> {
        match self {
            Self::Json => Ok(serde_json::to_vec_pretty(entries)?),
            Self::Text => Ok(render_text(entries)?.into_bytes()),
        }
    }
}

/// One block per entry, blocks separated by a blank line. Body lines are
/// indented so a blank line inside a body never reads as a separator.
fn render_text(entries: &[Entry]) -> Result<String> {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        text_block(&mut out, entry)
            .map_err(|e| Error::Internal(format!("Text export failed: {}", e)))?;
    }
    Ok(out)
}

fn text_block(out: &mut String, entry: &Entry) -> fmt::Result {
    let or_dash = |value: Option<&str>| value.unwrap_or("-").to_string();
    let tags = if entry.tags.is_empty() {
        "-".to_string()
    } else {
        entry.tags.join(", ")
    };

    writeln!(out, "Entry #{}", entry.id)?;
    writeln!(out, "Created: {}", entry.created_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out, "Title: {}", or_dash(entry.title.as_deref()))?;
    writeln!(out, "Category: {}", or_dash(entry.category.as_deref()))?;
    writeln!(out, "Mood: {}", or_dash(entry.mood.map(|m| m.as_str())))?;
    writeln!(out, "Weather: {}", or_dash(entry.weather.as_deref()))?;
    writeln!(out, "Location: {}", or_dash(entry.location.as_deref()))?;
    writeln!(out, "Tags: {}", tags)?;
    writeln!(out, "Words: {}", entry.word_count)?;
    writeln!(out, "Favorite: {}", if entry.is_favorite { "yes" } else { "no" })?;
    writeln!(out, "Body:")?;
    for line in entry.body.lines() {
        writeln!(out, "  {}", line)?;
    }
    Ok(())
}
