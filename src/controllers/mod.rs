/// Controller Module Index
///
/// Organizes the application's four collaborator areas behind the dispatcher.
/// Each module owns the handlers for one functional slice of the action table;
/// none of them is constructed per request — the dispatcher calls straight
/// into the resolved handler function.

/// Static informational pages (home, about, contact, sitemap).
pub mod pages;

/// Movie CRUD: listing, forms, create/update/delete, and the shared error page.
pub mod movies;

/// Login form, credential verification, session cookie issue and clear.
pub mod login;

/// Admin-only user management (create-user form and submission).
pub mod admin;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::session::{ROLE_ADMIN, Session};

/// html_escape
///
/// Minimal HTML entity escaping for user-supplied text echoed into pages.
pub(crate) fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// render_page
///
/// Wraps a body fragment in the shared layout (title, navigation bar, session
/// indicator) and attaches the HTTP status. Every server-rendered page in the
/// application goes through here.
pub(crate) fn render_page(
    status: StatusCode,
    title: &str,
    session: &Session,
    body: &str,
) -> Response {
    let nav_auth = match &session.user {
        Some(user) => format!(
            r#"<span>signed in as {}</span> <a href="/?action=logout">logout</a>"#,
            html_escape(&user.username)
        ),
        None => r#"<a href="/?action=login">login</a>"#.to_string(),
    };

    // The create-user link only makes sense for admins; the action itself is
    // gated server-side regardless.
    let admin_link = if session.is_granted(ROLE_ADMIN) {
        r#" | <a href="/?action=newUserForm">new user</a>"#
    } else {
        ""
    };

    let page = format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{title} - Movie Portal</title></head>
<body>
<nav>
  <a href="/">home</a> |
  <a href="/?action=list">movies</a> |
  <a href="/?action=newMovieForm">add movie</a> |
  <a href="/?action=about">about</a> |
  <a href="/?action=contact">contact</a> |
  <a href="/?action=sitemap">sitemap</a>{admin_link}
  &mdash; {nav_auth}
</nav>
<main>
{body}
</main>
</body>
</html>"#,
        title = html_escape(title),
        admin_link = admin_link,
        nav_auth = nav_auth,
        body = body,
    );

    (status, Html(page)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            html_escape(r#"<b>"Tom & Jerry's"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
        assert_eq!(html_escape("plain text"), "plain text");
    }
}
