use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{StatusCode, header};
use movie_portal::{
    AppConfig, AppState,
    controllers::{admin, login, movies},
    dispatch::ActionRequest,
    models::{CreateMovieRequest, Movie, UpdateMovieRequest, User},
    passwords,
    repository::Repository,
    session::{ROLE_USER, Session, SessionUser},
};
use uuid::Uuid;

// --- MOCK REPOSITORY IMPLEMENTATION ---

// Controller tests call the handler functions directly, so this mock records
// the inputs the handlers hand to the persistence layer.
#[derive(Default)]
struct MockRepo {
    movies: Vec<Movie>,
    user: Option<User>,
    // Captured by create_movie / create_user for input verification.
    created_movie: Mutex<Option<CreateMovieRequest>>,
    created_user: Mutex<Option<User>>,
    // When true, create_user reports a username conflict.
    user_conflict: bool,
}

#[async_trait]
impl Repository for MockRepo {
    async fn list_movies(&self) -> Vec<Movie> {
        self.movies.clone()
    }
    async fn get_movie(&self, id: i64) -> Option<Movie> {
        self.movies.iter().find(|m| m.id == id).cloned()
    }
    async fn create_movie(&self, req: CreateMovieRequest) -> Option<Movie> {
        let movie = Movie {
            id: 99,
            title: req.title.clone(),
            category: req.category.clone(),
            price: req.price,
            ..Movie::default()
        };
        *self.created_movie.lock().unwrap() = Some(req);
        Some(movie)
    }
    async fn update_movie(&self, id: i64, _req: UpdateMovieRequest) -> Option<Movie> {
        self.get_movie(id).await
    }
    async fn delete_movie(&self, id: i64) -> bool {
        self.movies.iter().any(|m| m.id == id)
    }
    async fn get_user(&self, _id: Uuid) -> Option<User> {
        self.user.clone()
    }
    async fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.user.clone().filter(|u| u.username == username)
    }
    async fn create_user(&self, user: User) -> Option<User> {
        if self.user_conflict {
            return None;
        }
        *self.created_user.lock().unwrap() = Some(user.clone());
        Some(user)
    }
}

// --- TEST UTILITIES ---

fn logged_in_session() -> Session {
    Session {
        user: Some(SessionUser {
            id: Uuid::from_u128(7),
            username: "tester".to_string(),
            role: ROLE_USER.to_string(),
        }),
    }
}

fn request_with(
    repo: Arc<MockRepo>,
    session: Session,
    form: &[(&str, &str)],
    query: &[(&str, &str)],
) -> ActionRequest {
    ActionRequest {
        state: AppState {
            repo,
            config: AppConfig::default(),
        },
        session,
        query: query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
        form: form
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    }
}

// --- MOVIE CONTROLLER TESTS ---

#[tokio::test]
async fn process_new_creates_and_redirects() {
    let repo = Arc::new(MockRepo::default());
    let req = request_with(
        repo.clone(),
        logged_in_session(),
        &[("title", "Alien"), ("category", "scifi"), ("price", "9.99")],
        &[],
    );

    let response = movies::process_new(req).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/?action=list"
    );

    let created = repo.created_movie.lock().unwrap().clone().expect("created");
    assert_eq!(created.title, "Alien");
    assert_eq!(created.category, "scifi");
    assert!((created.price - 9.99).abs() < f64::EPSILON);
}

#[tokio::test]
async fn process_new_rejects_a_negative_price() {
    let repo = Arc::new(MockRepo::default());
    let req = request_with(
        repo.clone(),
        logged_in_session(),
        &[("title", "Alien"), ("category", "scifi"), ("price", "-1")],
        &[],
    );

    let response = movies::process_new(req).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(repo.created_movie.lock().unwrap().is_none());
}

#[tokio::test]
async fn process_new_rejects_missing_fields() {
    let repo = Arc::new(MockRepo::default());
    let req = request_with(repo.clone(), logged_in_session(), &[("title", "Alien")], &[]);

    let response = movies::process_new(req).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn edit_form_unknown_id_is_not_found() {
    let repo = Arc::new(MockRepo::default());
    let req = request_with(repo, Session::anonymous(), &[], &[("id", "12")]);

    let response = movies::edit_form(req).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_form_non_numeric_id_is_not_found() {
    let repo = Arc::new(MockRepo::default());
    let req = request_with(repo, Session::anonymous(), &[], &[("id", "twelve")]);

    let response = movies::edit_form(req).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn process_update_rejects_unparseable_price() {
    let repo = Arc::new(MockRepo {
        movies: vec![Movie {
            id: 5,
            title: "Alien".to_string(),
            category: "scifi".to_string(),
            price: 9.99,
            ..Movie::default()
        }],
        ..MockRepo::default()
    });
    let req = request_with(
        repo,
        logged_in_session(),
        &[("id", "5"), ("price", "cheap")],
        &[],
    );

    let response = movies::process_update(req).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn delete_missing_movie_is_not_found() {
    let repo = Arc::new(MockRepo::default());
    let req = request_with(repo, logged_in_session(), &[], &[("id", "5")]);

    let response = movies::delete(req).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// --- ADMIN CONTROLLER TESTS ---

#[tokio::test]
async fn process_new_user_hashes_the_password() {
    let repo = Arc::new(MockRepo::default());
    let req = request_with(
        repo.clone(),
        logged_in_session(),
        &[("username", "sam"), ("password", "pw123"), ("role", "user")],
        &[],
    );

    let response = admin::process_new_user(req).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let created = repo.created_user.lock().unwrap().clone().expect("created");
    assert_eq!(created.username, "sam");
    assert_eq!(created.role, "user");
    // The plaintext must not be stored; the hash must verify.
    assert_ne!(created.password_hash, "pw123");
    assert!(passwords::verify_password(&created.password_hash, "pw123"));
}

#[tokio::test]
async fn process_new_user_rejects_unknown_roles() {
    let repo = Arc::new(MockRepo::default());
    let req = request_with(
        repo.clone(),
        logged_in_session(),
        &[
            ("username", "sam"),
            ("password", "pw123"),
            ("role", "superuser"),
        ],
        &[],
    );

    let response = admin::process_new_user(req).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(repo.created_user.lock().unwrap().is_none());
}

#[tokio::test]
async fn process_new_user_duplicate_username_conflicts() {
    let repo = Arc::new(MockRepo {
        user_conflict: true,
        ..MockRepo::default()
    });
    let req = request_with(
        repo,
        logged_in_session(),
        &[("username", "sam"), ("password", "pw123"), ("role", "user")],
        &[],
    );

    let response = admin::process_new_user(req).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// --- LOGIN CONTROLLER TESTS ---

fn stored_user(password: &str) -> User {
    User {
        id: Uuid::from_u128(42),
        username: "tester".to_string(),
        password_hash: passwords::hash_password(password).expect("hash"),
        role: ROLE_USER.to_string(),
    }
}

#[tokio::test]
async fn process_login_success_sets_cookie() {
    let repo = Arc::new(MockRepo {
        user: Some(stored_user("hunter2")),
        ..MockRepo::default()
    });
    let req = request_with(
        repo,
        Session::anonymous(),
        &[("username", "tester"), ("password", "hunter2")],
        &[],
    );

    let response = login::process_login(req).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie")
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("movie_session="));
}

#[tokio::test]
async fn process_login_unknown_user_is_unauthorized() {
    let repo = Arc::new(MockRepo::default());
    let req = request_with(
        repo,
        Session::anonymous(),
        &[("username", "ghost"), ("password", "pw")],
        &[],
    );

    let response = login::process_login(req).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn process_login_ignores_credentials_in_the_query_string() {
    // Credentials supplied via the query string only must be rejected.
    let repo = Arc::new(MockRepo {
        user: Some(stored_user("hunter2")),
        ..MockRepo::default()
    });
    let req = request_with(
        repo,
        Session::anonymous(),
        &[],
        &[("username", "tester"), ("password", "hunter2")],
    );

    let response = login::process_login(req).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
