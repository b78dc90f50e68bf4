use axum::{http::StatusCode, response::Response};

use super::render_page;
use crate::dispatch::ActionRequest;

/// home
///
/// Default landing page. Also the fallback target for every unknown, empty,
/// or missing action token.
pub async fn home(req: ActionRequest) -> Response {
    let body = r#"<h1>Movie Portal</h1>
<p>Welcome. Browse the <a href="/?action=list">movie catalogue</a>, or log in to add and edit entries.</p>"#;
    render_page(StatusCode::OK, "Home", &req.session, body)
}

/// about
pub async fn about(req: ActionRequest) -> Response {
    let body = r#"<h1>About</h1>
<p>Movie Portal is a small catalogue application for keeping track of movie records:
titles, categories and prices. Registered users can maintain the catalogue;
administrators can create accounts.</p>"#;
    render_page(StatusCode::OK, "About", &req.session, body)
}

/// contact
pub async fn contact(req: ActionRequest) -> Response {
    let body = r#"<h1>Contact</h1>
<p>Questions about the catalogue? Write to
<a href="mailto:catalogue@movie-portal.example">catalogue@movie-portal.example</a>.</p>"#;
    render_page(StatusCode::OK, "Contact", &req.session, body)
}

/// sitemap
///
/// Lists the navigable actions. Gated actions are included; attempting them
/// without a session simply renders the authorization error page.
pub async fn sitemap(req: ActionRequest) -> Response {
    let body = r#"<h1>Sitemap</h1>
<ul>
  <li><a href="/">Home</a></li>
  <li><a href="/?action=list">Movie list</a></li>
  <li><a href="/?action=newMovieForm">Add a movie</a> (requires login)</li>
  <li><a href="/?action=login">Login</a></li>
  <li><a href="/?action=newUserForm">Create user</a> (admin)</li>
  <li><a href="/?action=about">About</a></li>
  <li><a href="/?action=contact">Contact</a></li>
</ul>"#;
    render_page(StatusCode::OK, "Sitemap", &req.session, body)
}
