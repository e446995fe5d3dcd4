//! Search filters over a user's entries.
//!
//! `FilterParams` is the raw query string; `EntryFilter` is the validated
//! form consumed by the store. All predicates are ANDed together and an
//! absent predicate matches everything.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{parse_category_id, Mood};
use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Filter fields as they arrive in `GET /entries?start=&end=&keyword=&mood=&tag=&category=`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FilterParams {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    /// Category id.
    #[serde(default)]
    pub category: Option<String>,
}

impl FilterParams {
    pub fn is_empty(&self) -> bool {
        [&self.start, &self.end, &self.keyword, &self.mood, &self.tag, &self.category]
            .iter()
            .all(|v| non_blank(v.as_deref()).is_none())
    }
}

/// A validated filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// First calendar day included (UTC).
    pub start: Option<NaiveDate>,
    /// Last calendar day included (UTC).
    pub end: Option<NaiveDate>,
    /// Substring of the body or location, matched without regard to case.
    pub keyword: Option<String>,
    pub mood: Option<Mood>,
    pub tag: Option<String>,
    pub category_id: Option<i64>,
}

impl EntryFilter {
    /// Filter matching every entry.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn parse(params: &FilterParams) -> Result<Self> {
        let filter = Self {
            start: parse_date(params.start.as_deref(), "start")?,
            end: parse_date(params.end.as_deref(), "end")?,
            keyword: non_blank(params.keyword.as_deref()).map(String::from),
            mood: Mood::parse_optional(params.mood.as_deref())?,
            tag: non_blank(params.tag.as_deref()).map(String::from),
            category_id: parse_category_id(params.category.as_deref())?,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Reject inverted date ranges.
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(Error::Validation(format!(
                    "Start date {} is after end date {}",
                    start, end
                )));
            }
        }
        Ok(())
    }

    /// Inclusive lower bound on `created_at`.
    pub fn created_from(&self) -> Option<DateTime<Utc>> {
        self.start.map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
    }

    /// Exclusive upper bound on `created_at`: midnight after the end day.
    pub fn created_before(&self) -> Option<DateTime<Utc>> {
        self.end
            .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc() + Duration::days(1))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>> {
    match non_blank(value) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                Error::Validation(format!("Invalid {} date '{}', expected YYYY-MM-DD", field, v))
            }),
    }
}
