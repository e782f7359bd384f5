// ============================
// crates/backend-lib/src/handlers/pages.rs
// ============================
//! Minimal HTML pages.
//!
//! The login and register forms post straight to `/api/auth`; the profile
//! page is guarded by [`RequireLogin`] on top of the edge gate.
use axum::{http::StatusCode, response::Html};

use crate::gate::RequireLogin;
use crate::session::SessionHandle;

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{title} | Ex Libris</title></head>\
         <body><h1>{title}</h1>{body}</body></html>"
    ))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub async fn index() -> Html<String> {
    page(
        "Ex Libris",
        "<p>Your personal library.</p>\
         <nav><a href=\"/login\">Log in</a> | <a href=\"/register\">Register</a> | \
         <a href=\"/profile\">Profile</a></nav>",
    )
}

pub async fn login() -> Html<String> {
    page(
        "Log in",
        "<form method=\"post\" action=\"/api/auth/login\">\
         <label>Email or username <input name=\"identifier\" required></label>\
         <label>Password <input name=\"password\" type=\"password\" required></label>\
         <button type=\"submit\">Log in</button></form>",
    )
}

pub async fn register() -> Html<String> {
    page(
        "Register",
        "<form method=\"post\" action=\"/api/auth/register\">\
         <label>Username <input name=\"username\" required></label>\
         <label>Email <input name=\"email\" type=\"email\" required></label>\
         <label>Password <input name=\"password\" type=\"password\" required></label>\
         <button type=\"submit\">Register</button></form>",
    )
}

pub async fn unauthorized() -> (StatusCode, Html<String>) {
    (
        StatusCode::FORBIDDEN,
        page(
            "Unauthorized",
            "<p>You do not have access to that page.</p><a href=\"/\">Home</a>",
        ),
    )
}

pub async fn profile(RequireLogin(user): RequireLogin, session: SessionHandle) -> Html<String> {
    let role = if user.is_admin { "Administrator" } else { "Reader" };
    let since = session
        .session()
        .created_at
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default();
    page(
        "Profile",
        &format!(
            "<dl><dt>Username</dt><dd>{}</dd><dt>Email</dt><dd>{}</dd>\
             <dt>Role</dt><dd>{role}</dd><dt>Signed in</dt><dd>{since}</dd></dl>",
            escape(&user.username),
            escape(&user.email),
        ),
    )
}
