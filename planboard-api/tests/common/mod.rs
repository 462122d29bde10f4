/// Common test utilities for integration tests
///
/// Provides shared infrastructure:
/// - Test database setup (tests skip when DATABASE_URL is unset)
/// - Router construction against the real application state
/// - Request helpers and account registration via the API

use axum::body::Body;
use axum::http::{Request, StatusCode};
use planboard_api::app::{build_router, AppState};
use planboard_api::config::Config;
use serde_json::json;
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
}

impl TestContext {
    /// Creates a test context, or None when no test database is configured
    ///
    /// Requires DATABASE_URL; JWT_SECRET gets a fixed test default if
    /// unset. Migrations run before the first test touches the schema.
    pub async fn try_new() -> Option<Self> {
        if std::env::var("DATABASE_URL").is_err() {
            eprintln!("skipping: DATABASE_URL not set");
            return None;
        }
        if std::env::var("JWT_SECRET").is_err() {
            std::env::set_var("JWT_SECRET", "integration-test-secret-at-least-32-bytes");
        }

        let config = Config::from_env().expect("Test configuration should load");

        let db = PgPool::connect(&config.database.url)
            .await
            .expect("Test database should be reachable");

        // Path relative to Cargo.toml, not this file
        sqlx::migrate!("../migrations")
            .run(&db)
            .await
            .expect("Migrations should apply");

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Some(TestContext { db, app })
    }
}

/// Sends one request through the router and returns status + JSON body
///
/// An empty response body parses as JSON null.
pub async fn request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().call(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

/// Registers a fresh account via the API and returns (token, user)
///
/// Each call uses a unique random email so tests never collide.
pub async fn register_user(app: &axum::Router, role: &str) -> (String, serde_json::Value) {
    let email = format!("user-{}@example.com", Uuid::new_v4());

    let (status, body) = request(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Test User",
            "email": email,
            "password": "Password1",
            "role": role,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);

    let token = body["data"]["token"].as_str().unwrap().to_string();
    let user = body["data"]["user"].clone();
    (token, user)
}

/// Creates a task via the API and returns its view
pub async fn create_task(
    app: &axum::Router,
    token: &str,
    title: &str,
    created_for: &str,
) -> serde_json::Value {
    let (status, body) = request(
        app,
        "POST",
        "/api/tasks",
        Some(token),
        Some(json!({
            "title": title,
            "description": "A task created by the integration tests",
            "createdFor": created_for,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "task creation failed: {}", body);
    body["data"].clone()
}
