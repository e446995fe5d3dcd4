//! Category management page.

use super::{csrf_field, error_block, escape, layout};
use crate::middleware::SessionUser;
use crate::models::{Category, CategoryInput, DEFAULT_CATEGORY_COLOR};

pub fn categories_page(
    user: &SessionUser,
    categories: &[Category],
    input: &CategoryInput,
    error: Option<&str>,
) -> String {
    let items: String = if categories.is_empty() {
        "<p>No categories yet.</p>".to_string()
    } else {
        let rows: String = categories
            .iter()
            .map(|category| {
                format!(
                    r#"<tr>
<td><span class="tag" style="background:{color}">&nbsp;</span> <a href="/entries?category={id}">{name}</a></td>
<td><form method="post" action="/categories/{id}/delete" onsubmit="return confirm('Delete this category? Its entries are kept.')">{csrf}<button type="submit">Delete</button></form></td>
</tr>"#,
                    id = category.id,
                    color = escape(&category.color),
                    name = escape(&category.name),
                    csrf = csrf_field(&user.csrf_token),
                )
            })
            .collect();
        format!("<table>{}</table>", rows)
    };

    let color = input
        .color
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(DEFAULT_CATEGORY_COLOR);

    let body = format!(
        r#"<h1>Categories</h1>
{items}
<h2>New category</h2>
{error}
<form method="post" action="/categories">
{csrf}
<label>Name <input type="text" name="name" value="{name}" required></label>
<label>Color <input type="color" name="color" value="{color}"></label>
<p><button type="submit">Add category</button></p>
</form>"#,
        error = error_block(error),
        csrf = csrf_field(&user.csrf_token),
        name = escape(&input.name),
        color = escape(color),
    );
    layout("Categories", Some(user), &body)
}
