use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use super::{html_escape, render_page};
use crate::{
    dispatch::ActionRequest,
    models::{CreateMovieRequest, UpdateMovieRequest},
    session::Session,
};

/// error_page
///
/// The shared error surface for the whole application, including the
/// dispatcher's authorization failures. Renders the message inside the normal
/// layout so navigation stays available.
pub fn error_page(session: &Session, status: StatusCode, message: &str) -> Response {
    let body = format!(
        "<h1>Error</h1>\n<p>{}</p>",
        html_escape(message)
    );
    render_page(status, "Error", session, &body)
}

/// list
///
/// Renders the full movie catalogue as a table. Each row links to the edit
/// and delete actions for that movie.
pub async fn list(req: ActionRequest) -> Response {
    let movies = req.state.repo.list_movies().await;

    let mut rows = String::new();
    for movie in &movies {
        rows.push_str(&format!(
            r#"<tr>
  <td>{id}</td>
  <td>{title}</td>
  <td>{category}</td>
  <td>{price:.2}</td>
  <td><a href="/?action=editMovie&id={id}">edit</a>
      <a href="/?action=deleteMovie&id={id}">delete</a></td>
</tr>
"#,
            id = movie.id,
            title = html_escape(&movie.title),
            category = html_escape(&movie.category),
            price = movie.price,
        ));
    }

    let body = format!(
        r#"<h1>Movies</h1>
<table>
<tr><th>id</th><th>title</th><th>category</th><th>price</th><th></th></tr>
{rows}</table>
<p>{count} movie(s). <a href="/?action=newMovieForm">Add a movie</a></p>"#,
        rows = rows,
        count = movies.len(),
    );
    render_page(StatusCode::OK, "Movies", &req.session, &body)
}

/// new_form
///
/// Blank movie form posting back through `processNewMovie`.
pub async fn new_form(req: ActionRequest) -> Response {
    let body = r#"<h1>Add Movie</h1>
<form method="post" action="/">
  <input type="hidden" name="action" value="processNewMovie">
  <label>Title <input type="text" name="title"></label><br>
  <label>Category <input type="text" name="category"></label><br>
  <label>Price <input type="text" name="price"></label><br>
  <button type="submit">Create</button>
</form>"#;
    render_page(StatusCode::OK, "Add Movie", &req.session, body)
}

/// process_new
///
/// [Gated: logged in] Validates the submitted form fields and inserts the
/// movie. Success redirects to the listing; invalid input renders the error
/// page with 422.
pub async fn process_new(req: ActionRequest) -> Response {
    let Some(payload) = parse_create_form(&req) else {
        return error_page(
            &req.session,
            StatusCode::UNPROCESSABLE_ENTITY,
            "title, category and a non-negative price are required",
        );
    };

    match req.state.repo.create_movie(payload).await {
        Some(movie) => {
            tracing::info!(movie_id = movie.id, "movie created");
            Redirect::to("/?action=list").into_response()
        }
        None => error_page(
            &req.session,
            StatusCode::INTERNAL_SERVER_ERROR,
            "the movie could not be saved",
        ),
    }
}

/// edit_form
///
/// Pre-filled edit form for one movie, selected by the `id` parameter.
/// Unknown or malformed ids render the error page with 404.
pub async fn edit_form(req: ActionRequest) -> Response {
    let Some(id) = movie_id(&req) else {
        return missing_movie(&req.session);
    };

    let Some(movie) = req.state.repo.get_movie(id).await else {
        return missing_movie(&req.session);
    };

    let body = format!(
        r#"<h1>Edit Movie</h1>
<form method="post" action="/">
  <input type="hidden" name="action" value="processEditMovie">
  <input type="hidden" name="id" value="{id}">
  <label>Title <input type="text" name="title" value="{title}"></label><br>
  <label>Category <input type="text" name="category" value="{category}"></label><br>
  <label>Price <input type="text" name="price" value="{price:.2}"></label><br>
  <button type="submit">Save</button>
</form>"#,
        id = movie.id,
        title = html_escape(&movie.title),
        category = html_escape(&movie.category),
        price = movie.price,
    );
    render_page(StatusCode::OK, "Edit Movie", &req.session, &body)
}

/// process_update
///
/// [Gated: logged in] Applies a partial update: only submitted, non-empty
/// fields change. A present-but-unparseable price is rejected rather than
/// silently dropped.
pub async fn process_update(req: ActionRequest) -> Response {
    let Some(id) = movie_id(&req) else {
        return missing_movie(&req.session);
    };

    let price = match req.param("price") {
        Some(raw) => match raw.parse::<f64>() {
            Ok(p) if p >= 0.0 => Some(p),
            _ => {
                return error_page(
                    &req.session,
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "price must be a non-negative number",
                );
            }
        },
        None => None,
    };

    let payload = UpdateMovieRequest {
        title: req.param("title").map(str::to_string),
        category: req.param("category").map(str::to_string),
        price,
    };

    match req.state.repo.update_movie(id, payload).await {
        Some(movie) => {
            tracing::info!(movie_id = movie.id, "movie updated");
            Redirect::to("/?action=list").into_response()
        }
        None => missing_movie(&req.session),
    }
}

/// delete
///
/// [Gated: logged in] Removes a movie by id and returns to the listing.
pub async fn delete(req: ActionRequest) -> Response {
    let Some(id) = movie_id(&req) else {
        return missing_movie(&req.session);
    };

    if req.state.repo.delete_movie(id).await {
        tracing::info!(movie_id = id, "movie deleted");
        Redirect::to("/?action=list").into_response()
    } else {
        missing_movie(&req.session)
    }
}

// --- Helpers ---

fn movie_id(req: &ActionRequest) -> Option<i64> {
    req.param("id").and_then(|raw| raw.parse::<i64>().ok())
}

fn missing_movie(session: &Session) -> Response {
    error_page(session, StatusCode::NOT_FOUND, "no such movie")
}

fn parse_create_form(req: &ActionRequest) -> Option<CreateMovieRequest> {
    let title = req.param("title")?.to_string();
    let category = req.param("category")?.to_string();
    let price = req.param("price")?.parse::<f64>().ok().filter(|p| *p >= 0.0)?;
    Some(CreateMovieRequest {
        title,
        category,
        price,
    })
}
