//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An application router backed by the in-memory store
//! - Request builders and response body helpers
//! - User registration and login helpers
//! - A store that fails every call, for the 500 paths

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use async_trait::async_trait;
use std::sync::Arc;
use tickbox_api::app::{build_router, AppState};
use tickbox_api::config::{ApiConfig, Config, JwtConfig, LogFormat, StorageConfig};
use tickbox_shared::models::todo::{CreateTodo, Todo, UpdateTodo};
use tickbox_shared::models::user::{CreateUser, User};
use tickbox_shared::store::{
    memory::MemoryStore, Store, StoreError, StoreResult, TodoStore, UserStore,
};
use uuid::Uuid;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: Router,
    pub config: Config,
}

/// Status and parsed JSON body of a response
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestContext {
    /// Creates a new test context with an empty in-memory store
    pub fn new() -> Self {
        Self::with_jwt(default_jwt())
    }

    /// Creates a test context with custom token settings
    pub fn with_jwt(jwt: JwtConfig) -> Self {
        Self::build(Arc::new(MemoryStore::new()), jwt)
    }

    /// Creates a test context whose store fails every call
    pub fn with_failing_store() -> Self {
        Self::build(Arc::new(FailingStore), default_jwt())
    }

    fn build(store: Arc<dyn Store>, jwt: JwtConfig) -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            storage: StorageConfig::Memory,
            jwt,
            log_format: LogFormat::Pretty,
        };

        let state = AppState::new(store, config.clone());
        let app = build_router(state);

        TestContext { app, config }
    }

    /// Sends a request and parses the JSON response body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", token);
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    /// Sends a prebuilt request
    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }

    /// Registers a user and returns the response body
    pub async fn register(&self, username: &str, email: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/register",
            None,
            Some(serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
            })),
        )
        .await
    }

    /// Logs in and returns the response
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registers and logs in, returning the user ID and token
    pub async fn signup(&self, username: &str, email: &str) -> (String, String) {
        let registered = self.register(username, email, "pw").await;
        assert_eq!(registered.status, StatusCode::OK, "{}", registered.body);

        let logged_in = self.login(email, "pw").await;
        assert_eq!(logged_in.status, StatusCode::OK, "{}", logged_in.body);

        (
            registered.body["_id"].as_str().unwrap().to_string(),
            logged_in.body["token"].as_str().unwrap().to_string(),
        )
    }

    /// Creates a todo and returns its JSON
    pub async fn create_todo(&self, token: &str, body: Value) -> Value {
        let response = self.send("POST", "/todos", Some(token), Some(body)).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body
    }
}

fn default_jwt() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        previous_secrets: Vec::new(),
        expires_in_seconds: None,
    }
}

fn unavailable() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

/// Store whose every operation fails as if the database were unreachable
pub struct FailingStore;

#[async_trait]
impl UserStore for FailingStore {
    async fn insert_user(&self, _data: CreateUser) -> StoreResult<User> {
        Err(unavailable())
    }

    async fn find_user_by_email(&self, _email: &str) -> StoreResult<Option<User>> {
        Err(unavailable())
    }
}

#[async_trait]
impl TodoStore for FailingStore {
    async fn list_todos(&self, _owner: Uuid) -> StoreResult<Vec<Todo>> {
        Err(unavailable())
    }

    async fn insert_todo(&self, _data: CreateTodo) -> StoreResult<Todo> {
        Err(unavailable())
    }

    async fn update_todo(
        &self,
        _owner: Uuid,
        _id: Uuid,
        _changes: &UpdateTodo,
    ) -> StoreResult<Option<Todo>> {
        Err(unavailable())
    }

    async fn delete_todo(&self, _owner: Uuid, _id: Uuid) -> StoreResult<bool> {
        Err(unavailable())
    }
}

#[async_trait]
impl Store for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn ping(&self) -> StoreResult<()> {
        Err(unavailable())
    }
}
