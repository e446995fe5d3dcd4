//! Entry list, detail and form pages.

use super::{csrf_field, error_block, escape, layout};
use crate::middleware::SessionUser;
use crate::models::{Category, Entry, EntryInput, FilterParams, Mood};

const SNIPPET_CHARS: usize = 280;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Whether the entry form creates a new entry or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFormMode {
    Create,
    Edit(i64),
}

fn tag_links(entry: &Entry) -> String {
    entry
        .tags
        .iter()
        .map(|tag| {
            format!(
                r#"<a class="tag" href="/entries?tag={}">{}</a>"#,
                escape(&urlencoding::encode(tag)),
                escape(tag)
            )
        })
        .collect()
}

fn meta_line(entry: &Entry) -> String {
    let mut parts = vec![entry.created_at.format(DATE_FORMAT).to_string()];
    if let Some(category) = &entry.category {
        parts.push(format!(
            r#"<a href="/entries?category={}">{}</a>"#,
            entry.category_id.unwrap_or_default(),
            escape(category)
        ));
    }
    if let Some(mood) = entry.mood {
        parts.push(mood.label().to_string());
    }
    if let Some(weather) = &entry.weather {
        parts.push(escape(weather));
    }
    if let Some(location) = &entry.location {
        parts.push(escape(location));
    }
    parts.push(format!("{} words", entry.word_count));
    parts.join(" · ")
}

fn favorite_form(user: &SessionUser, entry: &Entry) -> String {
    let label = if entry.is_favorite { "★ Unpin" } else { "☆ Pin" };
    format!(
        r#"<form method="post" action="/entries/{id}/favorite" style="display:inline">{csrf}<button type="submit">{label}</button></form>"#,
        id = entry.id,
        csrf = csrf_field(&user.csrf_token),
    )
}

pub(super) fn mood_options(selected: Option<&str>) -> String {
    let selected = selected.and_then(Mood::from_str);
    let mut options = String::from(r#"<option value="">Any / none</option>"#);
    for mood in Mood::ALL {
        options.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            mood.as_str(),
            if selected == Some(mood) { " selected" } else { "" },
            mood.label()
        ));
    }
    options
}

/// `<option>` list of the user's categories; `selected` is a raw id.
pub(super) fn category_options(categories: &[Category], selected: Option<&str>, blank: &str) -> String {
    let selected = selected.map(str::trim);
    let mut options = format!(r#"<option value="">{}</option>"#, escape(blank));
    for category in categories {
        let id = category.id.to_string();
        options.push_str(&format!(
            r#"<option value="{id}"{sel}>{name}</option>"#,
            sel = if selected == Some(id.as_str()) { " selected" } else { "" },
            name = escape(&category.name),
        ));
    }
    options
}

fn filter_form(params: &FilterParams, categories: &[Category]) -> String {
    let value = |v: &Option<String>| escape(v.as_deref().unwrap_or(""));
    format!(
        r#"<form method="get" action="/entries">
<label>From <input type="date" name="start" value="{start}"></label>
<label>To <input type="date" name="end" value="{end}"></label>
<label>Keyword <input type="text" name="keyword" value="{keyword}"></label>
<label>Mood <select name="mood">{moods}</select></label>
<label>Tag <input type="text" name="tag" value="{tag}"></label>
<label>Category <select name="category">{categories}</select></label>
<p><button type="submit">Search</button> <a href="/entries">Clear</a></p>
</form>"#,
        start = value(&params.start),
        end = value(&params.end),
        keyword = value(&params.keyword),
        moods = mood_options(params.mood.as_deref()),
        tag = value(&params.tag),
        categories = category_options(categories, params.category.as_deref(), "Any"),
    )
}

pub fn entry_list_page(
    user: &SessionUser,
    entries: &[Entry],
    params: &FilterParams,
    categories: &[Category],
) -> String {
    let items: String = if entries.is_empty() {
        if params.is_empty() {
            r#"<p>No entries yet. <a href="/entries/new">Write your first one.</a></p>"#.to_string()
        } else {
            "<p>No entries match this search.</p>".to_string()
        }
    } else {
        entries
            .iter()
            .map(|entry| {
                let title = entry
                    .title
                    .as_deref()
                    .map(escape)
                    .unwrap_or_else(|| format!("Entry #{}", entry.id));
                format!(
                    r#"<article class="entry">
<h3><a href="/entries/{id}">{title}</a>{pin}</h3>
<p class="meta">{meta}</p>
<p>{snippet}</p>
<p>{tags} {favorite}</p>
</article>"#,
                    id = entry.id,
                    pin = if entry.is_favorite { " ★" } else { "" },
                    meta = meta_line(entry),
                    snippet = escape(&entry.snippet(SNIPPET_CHARS)),
                    tags = tag_links(entry),
                    favorite = favorite_form(user, entry),
                )
            })
            .collect()
    };

    let body = format!(
        r#"<h1>Your entries</h1>
<details{open}><summary>Search and filter</summary>
{filters}
</details>
<p class="meta">{count} entries</p>
{items}"#,
        open = if params.is_empty() { "" } else { " open" },
        filters = filter_form(params, categories),
        count = entries.len(),
    );
    layout("Entries", Some(user), &body)
}

pub fn entry_page(user: &SessionUser, entry: &Entry) -> String {
    let title = entry
        .title
        .as_deref()
        .map(escape)
        .unwrap_or_else(|| format!("Entry #{}", entry.id));

    let edited = if entry.updated_at > entry.created_at {
        format!(
            r#"<p class="meta">Edited {}</p>"#,
            entry.updated_at.format(DATE_FORMAT)
        )
    } else {
        String::new()
    };

    let body = format!(
        r#"<h1>{title}</h1>
<p class="meta">{meta}</p>
{edited}
<div class="body">{body}</div>
<p>{tags}</p>
<p>
<a href="/entries/{id}/edit">Edit</a>
{favorite}
<form method="post" action="/entries/{id}/delete" style="display:inline" onsubmit="return confirm('Delete this entry?')">{csrf}<button type="submit">Delete</button></form>
</p>"#,
        meta = meta_line(entry),
        body = escape(&entry.body).replace('\n', "<br>\n"),
        tags = tag_links(entry),
        id = entry.id,
        favorite = favorite_form(user, entry),
        csrf = csrf_field(&user.csrf_token),
    );
    layout(entry.title.as_deref().unwrap_or("Entry"), Some(user), &body)
}

pub fn entry_form_page(
    user: &SessionUser,
    mode: EntryFormMode,
    input: &EntryInput,
    categories: &[Category],
    error: Option<&str>,
) -> String {
    let (heading, action, submit) = match mode {
        EntryFormMode::Create => ("New entry".to_string(), "/entries".to_string(), "Save entry"),
        EntryFormMode::Edit(id) => (format!("Edit entry #{}", id), format!("/entries/{}", id), "Save changes"),
    };
    let value = |v: &Option<String>| escape(v.as_deref().unwrap_or(""));
    let templates_link = match mode {
        EntryFormMode::Create => r#"<p class="meta"><a href="/templates">Start from a template</a></p>"#,
        EntryFormMode::Edit(_) => "",
    };

    let body = format!(
        r#"<h1>{heading}</h1>
{templates_link}
{error}
<form method="post" action="{action}">
{csrf}
<label>Title <input type="text" name="title" value="{title}"></label>
<label>What happened today? <textarea name="body" rows="14" required>{body}</textarea></label>
<label>Category <select name="category_id">{categories}</select></label>
<label>Mood <select name="mood">{moods}</select></label>
<label>Weather <input type="text" name="weather" value="{weather}"></label>
<label>Location <input type="text" name="location" value="{location}"></label>
<label>Tags (comma separated) <input type="text" name="tags" value="{tags}"></label>
<p><button type="submit">{submit}</button> <a href="/entries">Cancel</a></p>
</form>"#,
        heading = escape(&heading),
        error = error_block(error),
        csrf = csrf_field(&user.csrf_token),
        title = value(&input.title),
        body = escape(&input.body),
        categories = category_options(categories, input.category_id.as_deref(), "No category"),
        moods = mood_options(input.mood.as_deref()),
        weather = value(&input.weather),
        location = value(&input.location),
        tags = value(&input.tags),
    );
    layout(&heading, Some(user), &body)
}
