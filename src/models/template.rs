//! Entry templates: named starting points that prefill the entry form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry::{optional_text, parse_category_id, parse_tag_field, EntryInput, Mood};
use crate::config::EntryLimits;
use crate::{Error, Result};

/// A stored template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryTemplate {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub body: String,
    pub category_id: Option<i64>,
    pub mood: Option<Mood>,
    pub weather: Option<String>,
    pub location: Option<String>,
    pub tags: Vec<String>,
    /// Prefills the new-entry form when no template is chosen.
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Template fields as submitted by the form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    /// Checkbox value; present means checked.
    #[serde(default)]
    pub is_default: Option<String>,
}

/// Validated template ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDraft {
    pub name: String,
    pub body: String,
    pub category_id: Option<i64>,
    pub mood: Option<Mood>,
    pub weather: Option<String>,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub is_default: bool,
}

impl TemplateInput {
    pub fn validate(&self, limits: &EntryLimits) -> Result<TemplateDraft> {
        let name = self.name.trim();
        let body = self.body.trim();

        if name.is_empty() || body.is_empty() {
            return Err(Error::Validation(
                "Template name and content are required".into(),
            ));
        }
        if name.chars().count() > limits.max_template_name_chars {
            return Err(Error::Validation(format!(
                "Template name is too long (maximum {} characters)",
                limits.max_template_name_chars
            )));
        }
        if body.chars().count() > limits.max_body_chars {
            return Err(Error::Validation(format!(
                "Template is too long (maximum {} characters)",
                limits.max_body_chars
            )));
        }

        Ok(TemplateDraft {
            name: name.to_string(),
            body: body.to_string(),
            category_id: parse_category_id(self.category_id.as_deref())?,
            mood: Mood::parse_optional(self.mood.as_deref())?,
            weather: optional_text(self.weather.as_deref(), "Weather", limits.max_weather_chars)?,
            location: optional_text(
                self.location.as_deref(),
                "Location",
                limits.max_location_chars,
            )?,
            tags: parse_tag_field(self.tags.as_deref(), limits)?,
            is_default: self
                .is_default
                .as_deref()
                .map(|v| !v.is_empty() && v != "false")
                .unwrap_or(false),
        })
    }
}

impl From<&EntryTemplate> for EntryInput {
    fn from(template: &EntryTemplate) -> Self {
        Self {
            title: Some(template.name.clone()),
            body: template.body.clone(),
            mood: template.mood.map(|m| m.as_str().to_string()),
            weather: template.weather.clone(),
            location: template.location.clone(),
            tags: Some(template.tags.join(", ")),
            category_id: template.category_id.map(|id| id.to_string()),
        }
    }
}
