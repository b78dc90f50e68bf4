use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// Movie
///
/// Represents a movie record from the `public.movies` table.
/// This is the primary data structure for the core business logic.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub price: f64,

    // Timestamp handling for database integration and JSON serialization.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User
///
/// Represents a user's canonical identity record stored in the `public.users` table.
/// The password hash never leaves the server: it is excluded from serialization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    // The login identifier, unique across the table.
    pub username: String,
    // Argon2id PHC string. Never serialized into any response.
    #[serde(skip_serializing)]
    pub password_hash: String,
    // The RBAC field: 'user' or 'admin'.
    pub role: String,
}

// --- Request Payloads (Input Schemas) ---

/// CreateMovieRequest
///
/// Validated payload for submitting a new movie, built by the movies controller
/// from the raw form fields of a `processNewMovie` submission.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateMovieRequest {
    pub title: String,
    pub category: String,
    pub price: f64,
}

/// UpdateMovieRequest
///
/// Partial update payload for modifying an existing movie (`processEditMovie`).
///
/// Uses `Option<T>` for all fields so a submission only changes the columns it
/// actually carries.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateMovieRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// CreateUserRequest
///
/// Input payload for the admin-gated `processNewUser` action.
/// Note: the password is hashed by the admin controller before it reaches the
/// repository and is never persisted or logged in the clear.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

/// LoginRequest
///
/// Credentials submitted through the `processLogin` action.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
