use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use super::{movies::error_page, render_page};
use crate::{
    dispatch::ActionRequest,
    models::{CreateUserRequest, User},
    passwords,
    session::{ROLE_ADMIN, ROLE_USER},
};

/// new_user_form
///
/// Account creation form posting back through the admin-gated
/// `processNewUser` action. The form itself is reachable without a session;
/// the submission is not.
pub async fn new_user_form(req: ActionRequest) -> Response {
    let body = r#"<h1>Create User</h1>
<form method="post" action="/">
  <input type="hidden" name="action" value="processNewUser">
  <label>Username <input type="text" name="username"></label><br>
  <label>Password <input type="password" name="password"></label><br>
  <label>Role
    <select name="role">
      <option value="user">user</option>
      <option value="admin">admin</option>
    </select>
  </label><br>
  <button type="submit">Create</button>
</form>"#;
    render_page(StatusCode::OK, "Create User", &req.session, body)
}

/// process_new_user
///
/// [Gated: role admin] Creates an account from the submitted form. The
/// password is hashed before it reaches the repository; the plaintext is
/// never stored or logged.
pub async fn process_new_user(req: ActionRequest) -> Response {
    let payload = match parse_user_form(&req) {
        Some(payload) => payload,
        None => {
            return error_page(
                &req.session,
                StatusCode::UNPROCESSABLE_ENTITY,
                "username, password and a valid role are required",
            );
        }
    };

    let password_hash = match passwords::hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("password hashing failed: {e}");
            return error_page(
                &req.session,
                StatusCode::INTERNAL_SERVER_ERROR,
                "the account could not be created",
            );
        }
    };

    let user = User {
        id: Uuid::new_v4(),
        username: payload.username,
        password_hash,
        role: payload.role,
    };

    match req.state.repo.create_user(user).await {
        Some(created) => {
            tracing::info!(username = %created.username, role = %created.role, "user created");
            Redirect::to("/").into_response()
        }
        // The repository maps a duplicate username to None.
        None => error_page(
            &req.session,
            StatusCode::CONFLICT,
            "that username is already taken",
        ),
    }
}

fn parse_user_form(req: &ActionRequest) -> Option<CreateUserRequest> {
    let username = req.form_field("username")?.to_string();
    let password = req.form_field("password")?.to_string();
    let role = req.form_field("role").unwrap_or(ROLE_USER);
    if role != ROLE_USER && role != ROLE_ADMIN {
        return None;
    }
    Some(CreateUserRequest {
        username,
        password,
        role: role.to_string(),
    })
}
