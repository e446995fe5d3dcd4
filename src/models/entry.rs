//! Diary entry types and input validation.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EntryLimits;
use crate::{Error, Result};

/// Mood attached to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Excited,
    Peaceful,
    Grateful,
    Neutral,
    Tired,
    Anxious,
    Sad,
    Angry,
}

impl Mood {
    pub const ALL: [Mood; 9] = [
        Self::Happy,
        Self::Excited,
        Self::Peaceful,
        Self::Grateful,
        Self::Neutral,
        Self::Tired,
        Self::Anxious,
        Self::Sad,
        Self::Angry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Excited => "excited",
            Self::Peaceful => "peaceful",
            Self::Grateful => "grateful",
            Self::Neutral => "neutral",
            Self::Tired => "tired",
            Self::Anxious => "anxious",
            Self::Sad => "sad",
            Self::Angry => "angry",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|mood| mood.as_str().eq_ignore_ascii_case(s))
    }

    /// Display label used in forms and pages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Happy => "😊 Happy",
            Self::Excited => "🎉 Excited",
            Self::Peaceful => "😌 Peaceful",
            Self::Grateful => "🙏 Grateful",
            Self::Neutral => "😐 Neutral",
            Self::Tired => "😴 Tired",
            Self::Anxious => "😟 Anxious",
            Self::Sad => "😢 Sad",
            Self::Angry => "😠 Angry",
        }
    }

    /// Parse an optional form value. Blank means "no mood".
    pub fn parse_optional(value: Option<&str>) -> Result<Option<Self>> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(None),
            Some(v) => Self::from_str(v)
                .map(Some)
                .ok_or_else(|| Error::Validation(format!("Unknown mood: {}", v))),
        }
    }
}

/// A diary entry with its metadata and tags.
///
/// Field names double as the JSON export schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_id: Option<i64>,
    /// Name of the category, resolved at read time.
    pub category: Option<String>,
    pub title: Option<String>,
    pub mood: Option<Mood>,
    pub weather: Option<String>,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub body: String,
    pub is_favorite: bool,
    pub word_count: i64,
}

impl Entry {
    /// Short plain-text preview of the body.
    pub fn snippet(&self, max_chars: usize) -> String {
        if self.body.chars().count() <= max_chars {
            return self.body.clone();
        }
        let mut out: String = self.body.chars().take(max_chars).collect();
        out.push('…');
        out
    }
}

/// Raw entry fields as submitted by a form, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Comma-separated tag list.
    #[serde(default)]
    pub tags: Option<String>,
    /// Category id as submitted; blank means none.
    #[serde(default)]
    pub category_id: Option<String>,
}

impl From<&Entry> for EntryInput {
    fn from(entry: &Entry) -> Self {
        Self {
            category_id: entry.category_id.map(|id| id.to_string()),
            title: entry.title.clone(),
            body: entry.body.clone(),
            mood: entry.mood.map(|m| m.as_str().to_string()),
            weather: entry.weather.clone(),
            location: entry.location.clone(),
            tags: Some(entry.tags.join(", ")),
        }
    }
}

/// Validated entry content ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub title: Option<String>,
    pub body: String,
    pub mood: Option<Mood>,
    pub weather: Option<String>,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub category_id: Option<i64>,
    pub word_count: i64,
}

impl EntryInput {
    /// Validate and normalize the submitted fields.
    pub fn validate(&self, limits: &EntryLimits) -> Result<EntryDraft> {
        let body = self.body.trim().to_string();
        let body_len = body.chars().count();

        if body_len == 0 {
            return Err(Error::Validation("Entry content cannot be empty".into()));
        }
        if body_len < limits.min_body_chars {
            return Err(Error::Validation(format!(
                "Entry must be at least {} characters long",
                limits.min_body_chars
            )));
        }
        if body_len > limits.max_body_chars {
            return Err(Error::Validation(format!(
                "Entry is too long (maximum {} characters)",
                limits.max_body_chars
            )));
        }

        let title = optional_text(self.title.as_deref(), "Title", limits.max_title_chars)?;
        let weather = optional_text(self.weather.as_deref(), "Weather", limits.max_weather_chars)?;
        let location =
            optional_text(self.location.as_deref(), "Location", limits.max_location_chars)?;
        let mood = Mood::parse_optional(self.mood.as_deref())?;

        let tags = parse_tag_field(self.tags.as_deref(), limits)?;
        let category_id = parse_category_id(self.category_id.as_deref())?;
        let word_count = count_words(&body);

        Ok(EntryDraft {
            title,
            body,
            mood,
            weather,
            location,
            tags,
            category_id,
            word_count,
        })
    }
}

pub(crate) fn optional_text(value: Option<&str>, field: &str, max_chars: usize) -> Result<Option<String>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.chars().count() > max_chars {
        return Err(Error::Validation(format!(
            "{} is too long (maximum {} characters)",
            field, max_chars
        )));
    }
    Ok(Some(value.to_string()))
}

/// Parse a submitted tag list and enforce the per-tag length limit.
pub(crate) fn parse_tag_field(value: Option<&str>, limits: &EntryLimits) -> Result<Vec<String>> {
    let tags = parse_tags(value.unwrap_or(""));
    if let Some(tag) = tags.iter().find(|t| t.chars().count() > limits.max_tag_chars) {
        return Err(Error::Validation(format!(
            "Tag '{}' is too long (maximum {} characters)",
            tag, limits.max_tag_chars
        )));
    }
    Ok(tags)
}

/// Parse an optional category id from a form or query value.
pub fn parse_category_id(value: Option<&str>) -> Result<Option<i64>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .map(Some)
            .ok_or_else(|| Error::Validation(format!("Invalid category: {}", v))),
    }
}

/// Split a comma-separated tag list into a sorted, deduplicated set.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn count_words(body: &str) -> i64 {
    body.split_whitespace().count() as i64
}

/// Case folding shared by stored search columns and search keywords.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}
