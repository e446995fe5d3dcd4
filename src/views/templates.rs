//! Entry template pages.

use super::entries::{category_options, mood_options};
use super::{csrf_field, error_block, escape, layout};
use crate::middleware::SessionUser;
use crate::models::{Category, EntryTemplate, TemplateInput};

pub fn templates_page(
    user: &SessionUser,
    templates: &[EntryTemplate],
    categories: &[Category],
    input: &TemplateInput,
    error: Option<&str>,
) -> String {
    let items: String = if templates.is_empty() {
        "<p>No templates yet. Save a starting point for entries you write often.</p>".to_string()
    } else {
        templates
            .iter()
            .map(|template| {
                format!(
                    r#"<article class="entry">
<h3>{name}{default}</h3>
<p>{preview}</p>
<p><a href="/templates/{id}/use">Use</a>
<form method="post" action="/templates/{id}/delete" style="display:inline" onsubmit="return confirm('Delete this template?')">{csrf}<button type="submit">Delete</button></form></p>
</article>"#,
                    id = template.id,
                    name = escape(&template.name),
                    default = if template.is_default { r#" <span class="tag">default</span>"# } else { "" },
                    preview = escape(&template.body),
                    csrf = csrf_field(&user.csrf_token),
                )
            })
            .collect()
    };

    let value = |v: &Option<String>| escape(v.as_deref().unwrap_or(""));
    let body = format!(
        r#"<h1>Templates</h1>
{items}
<h2>New template</h2>
{error}
<form method="post" action="/templates">
{csrf}
<label>Name <input type="text" name="name" value="{name}" required></label>
<label>Content <textarea name="body" rows="8" required>{content}</textarea></label>
<label>Category <select name="category_id">{categories}</select></label>
<label>Mood <select name="mood">{moods}</select></label>
<label>Weather <input type="text" name="weather" value="{weather}"></label>
<label>Location <input type="text" name="location" value="{location}"></label>
<label>Tags (comma separated) <input type="text" name="tags" value="{tags}"></label>
<label><input type="checkbox" name="is_default" value="on"{checked}> Use for every new entry</label>
<p><button type="submit">Save template</button></p>
</form>"#,
        error = error_block(error),
        csrf = csrf_field(&user.csrf_token),
        name = escape(&input.name),
        content = escape(&input.body),
        categories = category_options(categories, input.category_id.as_deref(), "No category"),
        moods = mood_options(input.mood.as_deref()),
        weather = value(&input.weather),
        location = value(&input.location),
        tags = value(&input.tags),
        checked = if input.is_default.is_some() { " checked" } else { "" },
    );
    layout("Templates", Some(user), &body)
}
