//! Landing, login, registration and account pages.

use super::{csrf_field, error_block, escape, layout};
use crate::middleware::SessionUser;
use crate::models::{MIN_PASSWORD_CHARS, MIN_USERNAME_CHARS};

pub fn landing_page() -> String {
    let body = r#"<h1>Your private diary</h1>
<p>Write down your days, tag them, track your mood and look back on how things went.</p>
<p><a href="/register">Create an account</a> or <a href="/login">log in</a>.</p>"#;
    layout("Welcome", None, body)
}

pub fn login_page(csrf_token: &str, username: &str, error: Option<&str>) -> String {
    let body = format!(
        r#"<h1>Log in</h1>
{error}
<form method="post" action="/login">
{csrf}
<label>Username <input type="text" name="username" value="{username}" required autofocus></label>
<label>Password <input type="password" name="password" required></label>
<p><button type="submit">Log in</button></p>
</form>
<p>No account yet? <a href="/register">Register</a>.</p>"#,
        error = error_block(error),
        csrf = csrf_field(csrf_token),
        username = escape(username),
    );
    layout("Log in", None, &body)
}

pub fn register_page(csrf_token: &str, username: &str, error: Option<&str>) -> String {
    let body = format!(
        r#"<h1>Register</h1>
{error}
<form method="post" action="/register">
{csrf}
<label>Username <input type="text" name="username" value="{username}" minlength="{min_user}" required autofocus></label>
<label>Password <input type="password" name="password" minlength="{min_pass}" required></label>
<label>Confirm password <input type="password" name="confirm_password" required></label>
<p class="meta">At least {min_pass} characters with an upper case letter, a lower case letter and a number.</p>
<p><button type="submit">Create account</button></p>
</form>"#,
        error = error_block(error),
        csrf = csrf_field(csrf_token),
        username = escape(username),
        min_user = MIN_USERNAME_CHARS,
        min_pass = MIN_PASSWORD_CHARS,
    );
    layout("Register", None, &body)
}

pub fn password_page(user: &SessionUser, error: Option<&str>, changed: bool) -> String {
    let notice = if changed {
        r#"<p class="notice">Password changed. Other sessions have been signed out.</p>"#
    } else {
        ""
    };

    let body = format!(
        r#"<h1>Change password</h1>
{notice}
{error}
<form method="post" action="/account/password">
{csrf}
<label>Current password <input type="password" name="current_password" required></label>
<label>New password <input type="password" name="new_password" minlength="{min_pass}" required></label>
<label>Confirm new password <input type="password" name="confirm_password" required></label>
<p><button type="submit">Change password</button></p>
</form>"#,
        error = error_block(error),
        csrf = csrf_field(&user.csrf_token),
        min_pass = MIN_PASSWORD_CHARS,
    );
    layout("Account", Some(user), &body)
}
