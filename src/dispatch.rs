use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{Query, Request, State},
    http::{Method, StatusCode, header},
    response::Response,
};

use crate::{
    AppState,
    controllers::{admin, login, movies, pages},
    session::{ROLE_ADMIN, Session},
};

/// Fixed text shown when a gated action is attempted without the required
/// session state. The exact wording is part of the external contract.
pub const AUTH_DENIED_MESSAGE: &str = "you are not authorised for this action";

/// Upper bound on the accepted form body. Submissions here are small HTML
/// forms; anything larger is dropped rather than buffered.
const FORM_BODY_LIMIT: usize = 64 * 1024;

/// ActionRequest
///
/// Everything a resolved handler may need for one request: the shared state,
/// the caller's session, and both parameter maps. The dispatcher passes no
/// further arguments; each handler reads its own ids and form fields from here.
pub struct ActionRequest {
    pub state: AppState,
    pub session: Session,
    pub query: HashMap<String, String>,
    pub form: HashMap<String, String>,
}

impl ActionRequest {
    /// Looks up a request parameter by name, query string first, then form
    /// body. Empty values are treated as absent, mirroring the action token
    /// resolution rule.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .or_else(|| {
                self.form
                    .get(name)
                    .map(String::as_str)
                    .filter(|v| !v.is_empty())
            })
    }

    /// Form-only field access, for credentials and other values that must not
    /// be accepted from the query string.
    pub fn form_field(&self, name: &str) -> Option<&str> {
        self.form
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Guard
///
/// The authorization requirement attached to a dispatch table entry,
/// evaluated uniformly against the current session before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// No requirement; anonymous callers pass.
    Public,
    /// Requires any authenticated session.
    LoggedIn,
    /// Requires an authenticated session holding the given role.
    Role(&'static str),
}

impl Guard {
    pub fn allows(&self, session: &Session) -> bool {
        match self {
            Guard::Public => true,
            Guard::LoggedIn => session.is_logged_in(),
            Guard::Role(role) => session.is_granted(role),
        }
    }
}

type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// A dispatchable handler. Plain function pointers keep the table `'static`
/// and make the entries trivially cheap to resolve.
pub type ActionHandler = fn(ActionRequest) -> HandlerFuture;

/// ActionRoute
///
/// One row of the dispatch table: the action token supplied by the client,
/// the guard evaluated before invocation, and the handler itself.
pub struct ActionRoute {
    pub token: &'static str,
    pub guard: Guard,
    pub handler: ActionHandler,
}

/// The complete action surface of the application. Tokens absent from this
/// table (including the empty and missing cases) fall through to the home page.
///
/// Only the handler for the resolved action ever runs; nothing is constructed
/// for the entries that lost the match.
pub static ACTIONS: &[ActionRoute] = &[
    ActionRoute {
        token: "processNewUser",
        guard: Guard::Role(ROLE_ADMIN),
        handler: |req| Box::pin(admin::process_new_user(req)),
    },
    ActionRoute {
        token: "newUserForm",
        guard: Guard::Public,
        handler: |req| Box::pin(admin::new_user_form(req)),
    },
    ActionRoute {
        token: "processLogin",
        guard: Guard::Public,
        handler: |req| Box::pin(login::process_login(req)),
    },
    ActionRoute {
        token: "logout",
        guard: Guard::Public,
        handler: |req| Box::pin(login::logout(req)),
    },
    ActionRoute {
        token: "login",
        guard: Guard::Public,
        handler: |req| Box::pin(login::login_form(req)),
    },
    ActionRoute {
        token: "processEditMovie",
        guard: Guard::LoggedIn,
        handler: |req| Box::pin(movies::process_update(req)),
    },
    ActionRoute {
        token: "editMovie",
        guard: Guard::Public,
        handler: |req| Box::pin(movies::edit_form(req)),
    },
    ActionRoute {
        token: "processNewMovie",
        guard: Guard::LoggedIn,
        handler: |req| Box::pin(movies::process_new(req)),
    },
    ActionRoute {
        token: "newMovieForm",
        guard: Guard::Public,
        handler: |req| Box::pin(movies::new_form(req)),
    },
    ActionRoute {
        token: "deleteMovie",
        guard: Guard::LoggedIn,
        handler: |req| Box::pin(movies::delete(req)),
    },
    ActionRoute {
        token: "about",
        guard: Guard::Public,
        handler: |req| Box::pin(pages::about(req)),
    },
    ActionRoute {
        token: "contact",
        guard: Guard::Public,
        handler: |req| Box::pin(pages::contact(req)),
    },
    ActionRoute {
        token: "list",
        guard: Guard::Public,
        handler: |req| Box::pin(movies::list(req)),
    },
    ActionRoute {
        token: "sitemap",
        guard: Guard::Public,
        handler: |req| Box::pin(pages::sitemap(req)),
    },
];

/// Finds the dispatch table entry for an action token.
pub fn resolve(token: &str) -> Option<&'static ActionRoute> {
    ACTIONS.iter().find(|route| route.token == token)
}

/// dispatch
///
/// The front-controller entry point. Every application request lands here
/// regardless of method; the `action` parameter, not the path, selects the
/// behavior.
///
/// Resolution order:
/// 1. `action` from the query string; if empty or absent, from the
///    urlencoded form body. Query wins when both are non-empty.
/// 2. Unknown tokens (and none at all) render the home page.
/// 3. The entry's guard is evaluated against the session. On failure the
///    error page renders with the fixed message and HTTP 403; the gated
///    handler is never invoked.
pub async fn dispatch(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<HashMap<String, String>>,
    request: Request,
) -> Response {
    let form = read_form_body(request).await;

    let token = query
        .get("action")
        .filter(|t| !t.is_empty())
        .or_else(|| form.get("action").filter(|t| !t.is_empty()))
        .cloned()
        .unwrap_or_default();

    let req = ActionRequest {
        state,
        session,
        query,
        form,
    };

    match resolve(&token) {
        Some(route) => {
            if route.guard.allows(&req.session) {
                tracing::debug!(action = route.token, "dispatching action");
                (route.handler)(req).await
            } else {
                tracing::warn!(action = route.token, "authorization denied");
                movies::error_page(&req.session, StatusCode::FORBIDDEN, AUTH_DENIED_MESSAGE)
            }
        }
        None => pages::home(req).await,
    }
}

/// read_form_body
///
/// Buffers and parses an `application/x-www-form-urlencoded` POST body into a
/// parameter map. Any other method or content type, and any malformed body,
/// yields an empty map; form parameters are simply absent in that case.
async fn read_form_body(request: Request) -> HashMap<String, String> {
    if request.method() != Method::POST {
        return HashMap::new();
    }

    let is_form = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    if !is_form {
        return HashMap::new();
    }

    let bytes = match axum::body::to_bytes(request.into_body(), FORM_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("failed to buffer form body: {e}");
            return HashMap::new();
        }
    };

    serde_urlencoded::from_bytes(&bytes).unwrap_or_else(|e| {
        tracing::debug!("malformed form body: {e}");
        HashMap::new()
    })
}
