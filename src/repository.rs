use crate::models::{CreateMovieRequest, Movie, UpdateMovieRequest, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. The controllers
/// interact with the data layer through this trait without knowing the specific
/// implementation (Postgres, Mock, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Movies ---
    async fn list_movies(&self) -> Vec<Movie>;
    async fn get_movie(&self, id: i64) -> Option<Movie>;
    async fn create_movie(&self, req: CreateMovieRequest) -> Option<Movie>;
    // Partial update: only the fields present in `req` change.
    async fn update_movie(&self, id: i64, req: UpdateMovieRequest) -> Option<Movie>;
    // Returns true if a row was deleted, false otherwise (unknown id).
    async fn delete_movie(&self, id: i64) -> bool;

    // --- Users / Auth ---
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn get_user_by_username(&self, username: &str) -> Option<User>;
    // Returns None on conflict (duplicate username) or database failure.
    async fn create_user(&self, user: User) -> Option<User>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// list_movies
    ///
    /// Retrieves every movie record, newest first. Database failures are logged
    /// and surface as an empty list rather than a page-breaking error.
    async fn list_movies(&self) -> Vec<Movie> {
        sqlx::query_as::<_, Movie>(
            r#"SELECT id, title, category, price, created_at, updated_at
               FROM movies ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_movies error: {:?}", e);
            vec![]
        })
    }

    /// get_movie
    ///
    /// Simple retrieval by id, used by the edit form and update/delete flows.
    async fn get_movie(&self, id: i64) -> Option<Movie> {
        sqlx::query_as::<_, Movie>(
            r#"SELECT id, title, category, price, created_at, updated_at
               FROM movies WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_movie error: {:?}", e);
            None
        })
    }

    /// create_movie
    ///
    /// Inserts a new movie and returns the stored row.
    async fn create_movie(&self, req: CreateMovieRequest) -> Option<Movie> {
        sqlx::query_as::<_, Movie>(
            r#"INSERT INTO movies (title, category, price, created_at, updated_at)
               VALUES ($1, $2, $3, NOW(), NOW())
               RETURNING id, title, category, price, created_at, updated_at"#,
        )
        .bind(req.title)
        .bind(req.category)
        .bind(req.price)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("create_movie error: {:?}", e);
            None
        })
    }

    /// update_movie
    ///
    /// Uses the PostgreSQL `COALESCE` function to handle `Option<T>` fields,
    /// only updating a column if the corresponding field in `req` is `Some`.
    async fn update_movie(&self, id: i64, req: UpdateMovieRequest) -> Option<Movie> {
        sqlx::query_as::<_, Movie>(
            r#"UPDATE movies
               SET title = COALESCE($2, title),
                   category = COALESCE($3, category),
                   price = COALESCE($4, price),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING id, title, category, price, created_at, updated_at"#,
        )
        .bind(id)
        .bind(req.title)
        .bind(req.category)
        .bind(req.price)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_movie error: {:?}", e);
            None
        })
    }

    /// delete_movie
    ///
    /// Deletes by id. Returns true only when a row was actually removed.
    async fn delete_movie(&self, id: i64) -> bool {
        match sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_movie error: {:?}", e);
                false
            }
        }
    }

    /// get_user
    ///
    /// Retrieves a user record by id.
    async fn get_user(&self, id: Uuid) -> Option<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
    }

    /// get_user_by_username
    ///
    /// Login lookup. The caller verifies the password hash; this method never does.
    async fn get_user_by_username(&self, username: &str) -> Option<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_user_by_username error: {:?}", e);
            None
        })
    }

    /// create_user
    ///
    /// Inserts a new account row. `ON CONFLICT DO NOTHING` turns a duplicate
    /// username into a `None` return instead of a database error.
    async fn create_user(&self, user: User) -> Option<User> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, username, password_hash, role)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (username) DO NOTHING
               RETURNING id, username, password_hash, role"#,
        )
        .bind(user.id)
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.role)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("create_user error: {:?}", e);
            None
        })
    }
}
