#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use clubhub::{
    api,
    config::Settings,
    domain::{NewUser, User, UserRole},
    repository::{SqliteUserRepository, UserRepository},
    service::ServiceContext,
};
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tower::ServiceExt;

/// A single shared in-memory connection so every query sees the same database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    pool
}

pub async fn test_context() -> Arc<ServiceContext> {
    let settings = Settings::default();
    Arc::new(ServiceContext::from_pool(test_pool().await, &settings.auth))
}

pub fn test_app(ctx: Arc<ServiceContext>) -> Router {
    api::create_app(ctx, Arc::new(Settings::default()))
}

/// Inserts a user directly, bypassing the self-registration rules.
pub async fn insert_user(pool: &SqlitePool, name: &str, email: &str, role: UserRole) -> User {
    SqliteUserRepository::new(pool.clone())
        .create(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role,
        })
        .await
        .expect("insert user")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    TestResponse { status, headers, body }
}

/// Registers through the API and returns `(token, user id)`.
pub async fn register(app: &Router, name: &str, email: &str) -> (String, String) {
    let response = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "name": name,
            "email": email,
            "password": "secret123",
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    (
        response.body["token"].as_str().expect("token").to_string(),
        response.body["user"]["id"].as_str().expect("id").to_string(),
    )
}
