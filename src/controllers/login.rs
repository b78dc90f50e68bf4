use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};

use super::{movies::error_page, render_page};
use crate::{
    dispatch::ActionRequest,
    models::LoginRequest,
    passwords,
    session::{self, SessionUser},
};

/// login_form
///
/// Credential form posting back through `processLogin`.
pub async fn login_form(req: ActionRequest) -> Response {
    let body = r#"<h1>Login</h1>
<form method="post" action="/">
  <input type="hidden" name="action" value="processLogin">
  <label>Username <input type="text" name="username"></label><br>
  <label>Password <input type="password" name="password"></label><br>
  <button type="submit">Sign in</button>
</form>"#;
    render_page(StatusCode::OK, "Login", &req.session, body)
}

/// process_login
///
/// Verifies the submitted credentials against the stored argon2 hash and, on
/// success, opens a session by setting the signed cookie and redirecting home.
/// Credentials are read from the form body only; they are never accepted from
/// the query string.
pub async fn process_login(req: ActionRequest) -> Response {
    let credentials = match (req.form_field("username"), req.form_field("password")) {
        (Some(username), Some(password)) => LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        },
        _ => {
            return error_page(
                &req.session,
                StatusCode::UNPROCESSABLE_ENTITY,
                "username and password are required",
            );
        }
    };

    let user = req
        .state
        .repo
        .get_user_by_username(&credentials.username)
        .await;

    let verified = user
        .as_ref()
        .is_some_and(|u| passwords::verify_password(&u.password_hash, &credentials.password));

    if !verified {
        tracing::warn!(username = %credentials.username, "failed login attempt");
        return error_page(&req.session, StatusCode::UNAUTHORIZED, "invalid credentials");
    }

    // `verified` implies `user` is present.
    let Some(user) = user else {
        return error_page(&req.session, StatusCode::UNAUTHORIZED, "invalid credentials");
    };

    let session_user = SessionUser {
        id: user.id,
        username: user.username,
        role: user.role,
    };

    let token = match session::issue_token(&session_user, &req.state.config.session_secret) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("failed to sign session token: {e}");
            return error_page(
                &req.session,
                StatusCode::INTERNAL_SERVER_ERROR,
                "login failed",
            );
        }
    };

    tracing::info!(username = %session_user.username, "login successful");
    with_cookie(Redirect::to("/").into_response(), &session::login_cookie(&token))
}

/// logout
///
/// Clears the session cookie and returns to the home page. Safe to call while
/// anonymous.
pub async fn logout(req: ActionRequest) -> Response {
    if let Some(user) = &req.session.user {
        tracing::info!(username = %user.username, "logout");
    }
    with_cookie(Redirect::to("/").into_response(), &session::logout_cookie())
}

/// Attaches a Set-Cookie header to a response. Cookie values produced by this
/// module are always valid header values; a failure here is logged and the
/// response returned uncookied.
fn with_cookie(mut response: Response, cookie: &str) -> Response {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!("invalid session cookie value: {e}"),
    }
    response
}
