//! Shared helpers for HTTP-level tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use moviez_api::AppState;
use moviez_core::config::{AppConfig, BootstrapAdmin};
use moviez_database::Stores;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "AdminPass123";

/// Test application on the in-memory backend.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for reaching services directly
    pub state: AppState,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` field of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

impl TestApp {
    /// Create a new test application with a bootstrap admin.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application from an explicit configuration.
    pub async fn with_config(config: AppConfig) -> Self {
        let state = moviez_api::build_state(config, Stores::in_memory())
            .await
            .expect("Failed to build state");
        let router = moviez_api::build_app(state.clone());
        Self { router, state }
    }

    /// Send a JSON request through the router.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);

        if body.is_some() {
            req = req.header("Content-Type", "application/json");
        }
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Register a user and return its access token.
    pub async fn register_and_login(&self, username: &str) -> String {
        let password = "password123";
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": password,
                })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        self.login(username, password).await
    }

    /// Log in and return the access token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({ "username": username, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.data()["access_token"]
            .as_str()
            .expect("access_token missing")
            .to_string()
    }

    /// Token of the bootstrap admin.
    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    /// Create a movie and a showtime starting in `starts_in`; returns the
    /// showtime id.
    pub async fn create_showtime(
        &self,
        admin_token: &str,
        starts_in: chrono::Duration,
        capacity: i32,
    ) -> String {
        let movie = self
            .request(
                "POST",
                "/api/movies",
                Some(json!({ "title": "Alien", "genre": "Horror" })),
                Some(admin_token),
            )
            .await;
        assert_eq!(movie.status, StatusCode::CREATED, "{:?}", movie.body);
        let movie_id = movie.data()["id"].as_str().expect("movie id").to_string();

        let start = chrono::Utc::now() + starts_in;
        let showtime = self
            .request(
                "POST",
                "/api/showtimes",
                Some(json!({
                    "movie_id": movie_id,
                    "start_time": start,
                    "end_time": start + chrono::Duration::hours(2),
                    "capacity": capacity,
                })),
                Some(admin_token),
            )
            .await;
        assert_eq!(showtime.status, StatusCode::CREATED, "{:?}", showtime.body);
        showtime.data()["id"]
            .as_str()
            .expect("showtime id")
            .to_string()
    }
}

/// Configuration for tests: in-memory stores, short guard timeout.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "test-secret-for-http-tests".to_string();
    config.auth.bootstrap_admin = Some(BootstrapAdmin {
        username: ADMIN_USERNAME.to_string(),
        email: "admin@example.com".to_string(),
        password: ADMIN_PASSWORD.to_string(),
    });
    config.reservation.guard_timeout_ms = 100;
    config
}
