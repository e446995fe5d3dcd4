//! Statistics page.

use super::{escape, layout};
use crate::middleware::SessionUser;
use crate::services::EntryStats;

const TOP_TAGS: usize = 20;

pub fn stats_page(user: &SessionUser, stats: &EntryStats) -> String {
    if stats.total_entries == 0 {
        let body = r#"<h1>Statistics</h1>
<p>No entries yet. <a href="/entries/new">Write your first one.</a></p>"#;
        return layout("Statistics", Some(user), body);
    }

    let most_common = stats
        .most_common_mood
        .map(|m| m.label())
        .unwrap_or("-");

    let months: String = stats
        .entries_per_month
        .iter()
        .rev()
        .map(|(month, count)| format!("<tr><td>{}</td><td>{}</td></tr>", escape(month), count))
        .collect();

    let moods: String = stats
        .mood_counts
        .iter()
        .map(|(mood, count)| {
            format!(
                r#"<tr><td><a href="/entries?mood={}">{}</a></td><td>{}</td></tr>"#,
                mood.as_str(),
                mood.label(),
                count
            )
        })
        .collect();

    let tags: String = stats
        .top_tags(TOP_TAGS)
        .into_iter()
        .map(|(tag, count)| {
            format!(
                r#"<tr><td><a href="/entries?tag={}">{}</a></td><td>{}</td></tr>"#,
                escape(&urlencoding::encode(tag)),
                escape(tag),
                count
            )
        })
        .collect();

    let categories: String = stats
        .category_counts
        .iter()
        .map(|(name, count)| format!("<tr><td>{}</td><td>{}</td></tr>", escape(name), count))
        .collect();

    let trends: String = stats
        .mood_trends
        .iter()
        .rev()
        .map(|(day, moods)| {
            let labels: Vec<&str> = moods.iter().map(|m| m.label()).collect();
            format!("<tr><td>{}</td><td>{}</td></tr>", escape(day), labels.join(" "))
        })
        .collect();
    let trends = if trends.is_empty() {
        "<p>No moods recorded in the last 30 days.</p>".to_string()
    } else {
        format!("<table>{}</table>", trends)
    };

    let body = format!(
        r#"<h1>Statistics</h1>
<table>
<tr><th>Entries</th><td>{total}</td></tr>
<tr><th>Words</th><td>{words}</td></tr>
<tr><th>Average words per entry</th><td>{avg:.1}</td></tr>
<tr><th>Favorites</th><td>{favorites}</td></tr>
<tr><th>Most common mood</th><td>{most_common}</td></tr>
<tr><th>Current streak</th><td>{current} days</td></tr>
<tr><th>Longest streak</th><td>{longest} days</td></tr>
</table>
<h2>Entries per month</h2>
<table>{months}</table>
<h2>Moods</h2>
<table>{moods}</table>
<h2>Mood trend, last 30 days</h2>
{trends}
<h2>Categories</h2>
<table>{categories}</table>
<h2>Tags</h2>
<table>{tags}</table>"#,
        total = stats.total_entries,
        words = stats.total_words,
        avg = stats.avg_words,
        favorites = stats.favorite_count,
        current = stats.current_streak,
        longest = stats.longest_streak,
    );
    layout("Statistics", Some(user), &body)
}
