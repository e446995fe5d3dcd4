//! Statistics over a user's entries.
//!
//! Everything is derived in one pass over the entry list and recomputed
//! on every request; nothing is cached or stored.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::{Entry, Mood};

/// Days covered by `mood_trends`, counted back from today.
pub const MOOD_TREND_DAYS: i64 = 30;

/// Aggregated statistics for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntryStats {
    pub total_entries: usize,
    pub total_words: i64,
    /// Mean words per entry, rounded to one decimal.
    pub avg_words: f64,
    pub favorite_count: usize,
    /// `YYYY-MM` to entry count. Months without entries are absent.
    pub entries_per_month: BTreeMap<String, usize>,
    pub mood_counts: BTreeMap<Mood, usize>,
    pub tag_counts: BTreeMap<String, usize>,
    /// Category name to entry count. Uncategorized entries are absent.
    pub category_counts: BTreeMap<String, usize>,
    /// `YYYY-MM-DD` to the moods recorded that day, oldest entry first,
    /// for the last [`MOOD_TREND_DAYS`] days.
    pub mood_trends: BTreeMap<String, Vec<Mood>>,
    pub most_common_mood: Option<Mood>,
    /// Consecutive UTC days with at least one entry, ending today or yesterday.
    pub current_streak: u32,
    pub longest_streak: u32,
}

impl EntryStats {
    /// Compute statistics for `entries` as seen on `today` (UTC).
    pub fn from_entries(entries: &[Entry], today: NaiveDate) -> Self {
        let mut stats = Self::default();
        let mut days = BTreeSet::new();
        let trend_start = today - Duration::days(MOOD_TREND_DAYS);

        for entry in entries {
            stats.total_entries += 1;
            stats.total_words += entry.word_count;
            if entry.is_favorite {
                stats.favorite_count += 1;
            }

            *stats
                .entries_per_month
                .entry(entry.created_at.format("%Y-%m").to_string())
                .or_default() += 1;

            let day = entry.created_at.date_naive();
            if let Some(mood) = entry.mood {
                *stats.mood_counts.entry(mood).or_default() += 1;
                if day >= trend_start && day <= today {
                    stats
                        .mood_trends
                        .entry(day.format("%Y-%m-%d").to_string())
                        .or_default()
                        .push(mood);
                }
            }
            if let Some(category) = &entry.category {
                *stats.category_counts.entry(category.clone()).or_default() += 1;
            }
            for tag in &entry.tags {
                *stats.tag_counts.entry(tag.clone()).or_default() += 1;
            }

            days.insert(day);
        }

        if stats.total_entries > 0 {
            let avg = stats.total_words as f64 / stats.total_entries as f64;
            stats.avg_words = (avg * 10.0).round() / 10.0;
        }

        stats.most_common_mood = most_common_mood(&stats.mood_counts);
        stats.current_streak = current_streak(&days, today);
        stats.longest_streak = longest_streak(&days);
        stats
    }

    /// Tags by descending count, ties alphabetical.
    pub fn top_tags(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut tags: Vec<(&str, usize)> = self
            .tag_counts
            .iter()
            .map(|(tag, count)| (tag.as_str(), *count))
            .collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        tags.truncate(limit);
        tags
    }
}

/// Highest count wins; ties go to the alphabetically first mood name.
fn most_common_mood(counts: &BTreeMap<Mood, usize>) -> Option<Mood> {
    counts
        .iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.as_str().cmp(a.as_str())))
        .map(|(mood, _)| *mood)
}

fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut day = if days.contains(&today) {
        today
    } else if days.contains(&(today - Duration::days(1))) {
        today - Duration::days(1)
    } else {
        return 0;
    };

    let mut streak = 0;
    while days.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

fn longest_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        run = match previous {
            Some(prev) if *day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }
    longest
}
