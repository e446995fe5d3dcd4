//! HTML rendering.
//!
//! Pages are assembled with `format!` around a shared layout. Every
//! user-supplied value goes through `escape` before it reaches markup.

mod auth;
mod categories;
mod entries;
mod stats;
mod templates;

pub use auth::{landing_page, login_page, password_page, register_page};
pub use categories::categories_page;
pub use entries::{entry_form_page, entry_list_page, entry_page, EntryFormMode};
pub use stats::stats_page;
pub use templates::templates_page;

use axum::http::StatusCode;

use crate::middleware::SessionUser;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 52rem; margin: 0 auto; padding: 1rem; color: #222; }
nav { display: flex; gap: 1rem; align-items: center; border-bottom: 1px solid #ddd; padding-bottom: .5rem; margin-bottom: 1rem; }
nav form { margin-left: auto; }
.entry { border: 1px solid #e3e3e3; border-radius: 6px; padding: .75rem 1rem; margin-bottom: .75rem; }
.meta { color: #666; font-size: .9rem; }
.tag { background: #eef; border-radius: 4px; padding: 0 .35rem; margin-right: .25rem; font-size: .85rem; }
.error { background: #fee; border: 1px solid #f99; padding: .5rem; border-radius: 4px; }
.notice { background: #efe; border: 1px solid #9c9; padding: .5rem; border-radius: 4px; }
label { display: block; margin-top: .5rem; }
input[type=text], input[type=password], input[type=date], select, textarea { width: 100%; box-sizing: border-box; }
table { border-collapse: collapse; }
td, th { padding: .2rem .6rem; text-align: left; }
"#;

/// Escape text for use in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Hidden form field carrying a CSRF token.
pub fn csrf_field(token: &str) -> String {
    format!(r#"<input type="hidden" name="csrf_token" value="{}">"#, escape(token))
}

/// Wrap a page body in the shared layout.
pub fn layout(title: &str, user: Option<&SessionUser>, body: &str) -> String {
    let nav = match user {
        Some(user) => format!(
            r#"<a href="/entries">Entries</a>
<a href="/entries/new">New entry</a>
<a href="/templates">Templates</a>
<a href="/categories">Categories</a>
<a href="/stats">Stats</a>
<a href="/export?format=txt">Export</a>
<a href="/account/password">Account</a>
<form method="post" action="/logout">{csrf}<button type="submit">Log out {name}</button></form>"#,
            csrf = csrf_field(&user.csrf_token),
            name = escape(&user.username),
        ),
        None => r#"<a href="/">Diary</a>
<a href="/login">Log in</a>
<a href="/register">Register</a>"#
            .to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Diary</title>
<style>{STYLE}</style>
</head>
<body>
<nav>{nav}</nav>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    )
}

/// Inline error message block, empty when there is nothing to show.
pub fn error_block(error: Option<&str>) -> String {
    error
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .unwrap_or_default()
}

/// Standalone page for an error response.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        r#"<h1>{code} {reason}</h1>
<p class="error">{message}</p>
<p><a href="/entries">Back to your diary</a></p>"#,
        code = status.as_u16(),
        reason = escape(reason),
        message = escape(message),
    );
    layout(reason, None, &body)
}
