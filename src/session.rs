use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "movie_session";

/// Session lifetime in seconds (24 hours).
const SESSION_TTL_SECS: i64 = 60 * 60 * 24;

/// Role granted to administrators; required by the `processNewUser` action.
pub const ROLE_ADMIN: &str = "admin";
/// Default role for accounts created through the admin form.
pub const ROLE_USER: &str = "user";

/// Claims
///
/// Payload structure of the session token. The claims are signed with the
/// server's session secret and validated on every request that carries the cookie.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): The UUID of the user.
    pub sub: Uuid,
    /// Login name, echoed in page headers without a database round trip.
    pub username: String,
    /// The user's role, used for Role-Based Access Control (RBAC).
    pub role: String,
    /// Expiration Time (exp): Timestamp after which the session must not be accepted.
    pub exp: usize,
    /// Issued At (iat): Timestamp when the session was opened.
    pub iat: usize,
}

/// SessionUser
///
/// The resolved identity of a logged-in caller, decoded from the session cookie.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub role: String,
}

/// Session
///
/// Read-only view of the caller's authentication state for the duration of one
/// request. The dispatcher queries it through `is_logged_in` and `is_granted`
/// before invoking a gated handler; the session itself never blocks a request.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<SessionUser>,
}

impl Session {
    /// A session with no authenticated user.
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    /// True when the caller presented a valid, unexpired session cookie.
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// True when the caller is logged in and holds the given role.
    pub fn is_granted(&self, role: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == role)
    }
}

/// Session Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making Session usable as a function
/// argument in the dispatcher. Extraction is **infallible**: a missing, malformed,
/// or expired cookie yields an anonymous session rather than a rejection, because
/// authorization decisions belong to the dispatch table, not the extractor.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    // Allows the extractor to pull the AppConfig (for the session secret).
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        let Some(token) = session_cookie(parts) else {
            return Ok(Session::anonymous());
        };

        Ok(decode_session(&token, &config.session_secret))
    }
}

/// Pulls the raw session token out of the Cookie header, if present.
fn session_cookie(parts: &Parts) -> Option<String> {
    let cookies = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// decode_session
///
/// Validates the signed token and maps it to a session. Any failure (bad
/// signature, expired, malformed) degrades to an anonymous session; the
/// specific failure kind is not surfaced to the caller.
pub fn decode_session(token: &str, secret: &str) -> Session {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Session {
            user: Some(SessionUser {
                id: data.claims.sub,
                username: data.claims.username,
                role: data.claims.role,
            }),
        },
        Err(e) => {
            tracing::debug!("session cookie rejected: {:?}", e.kind());
            Session::anonymous()
        }
    }
}

/// issue_token
///
/// Signs a fresh session token for a user who just authenticated.
pub fn issue_token(user: &SessionUser, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role.clone(),
        iat: now as usize,
        exp: (now + SESSION_TTL_SECS) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Set-Cookie value opening a session. HttpOnly keeps the token away from
/// page scripts; SameSite=Lax still allows the `?action=` navigation links.
pub fn login_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, SESSION_TTL_SECS
    )
}

/// Set-Cookie value ending the session immediately.
pub fn logout_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> SessionUser {
        SessionUser {
            id: Uuid::from_u128(7),
            username: "grace".to_string(),
            role: ROLE_ADMIN.to_string(),
        }
    }

    #[test]
    fn issue_then_decode_roundtrip() {
        let token = issue_token(&sample_user(), "secret-a").expect("token");
        let session = decode_session(&token, "secret-a");

        assert!(session.is_granted(ROLE_ADMIN));
        let user = session.user.expect("session should be logged in");
        assert_eq!(user.username, "grace");
        assert_eq!(user.id, Uuid::from_u128(7));
    }

    #[test]
    fn wrong_secret_yields_anonymous() {
        let token = issue_token(&sample_user(), "secret-a").expect("token");
        let session = decode_session(&token, "secret-b");
        assert!(!session.is_logged_in());
    }

    #[test]
    fn granted_requires_matching_role() {
        let mut user = sample_user();
        user.role = ROLE_USER.to_string();
        let session = Session { user: Some(user) };

        assert!(session.is_logged_in());
        assert!(session.is_granted(ROLE_USER));
        assert!(!session.is_granted(ROLE_ADMIN));
    }

    #[test]
    fn anonymous_is_granted_nothing() {
        let session = Session::anonymous();
        assert!(!session.is_logged_in());
        assert!(!session.is_granted(ROLE_ADMIN));
    }
}
