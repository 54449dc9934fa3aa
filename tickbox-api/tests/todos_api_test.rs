/// Integration tests for the Tickbox API
///
/// These tests drive the full router (authentication layer, handlers, error
/// mapping) against the in-memory store:
/// - Registration and login
/// - Token handling on protected routes
/// - Todo CRUD and per-user isolation
/// - Partial update semantics

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use common::{TestContext, TEST_SECRET};
use serde_json::json;
use tickbox_api::config::JwtConfig;
use tickbox_shared::auth::jwt::{Claims, TokenConfig, TokenIssuer};
use uuid::Uuid;

/// Register, log in, create, list, delete, list
#[tokio::test]
async fn test_end_to_end_todo_flow() {
    let ctx = TestContext::new();
    let (user_id, token) = ctx.signup("alice", "a@x.com").await;

    let todo = ctx.create_todo(&token, json!({ "todoTitle": "buy milk" })).await;
    assert_eq!(todo["todoTitle"], "buy milk");
    assert_eq!(todo["userId"], user_id.as_str());
    assert_eq!(todo["completed"], false);
    assert!(todo["_id"].is_string());

    let list = ctx.send("GET", "/todos", Some(&token), None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body, json!([todo.clone()]));

    let uri = format!("/todos/{}", todo["_id"].as_str().unwrap());
    let deleted = ctx.send("DELETE", &uri, Some(&token), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body, json!({ "message": "Todo deleted successfully" }));

    let list = ctx.send("GET", "/todos", Some(&token), None).await;
    assert_eq!(list.body, json!([]));
}

#[tokio::test]
async fn test_register_returns_user_without_hash() {
    let ctx = TestContext::new();

    let response = ctx.register("alice", "a@x.com", "pw").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], "alice");
    assert_eq!(response.body["email"], "a@x.com");
    assert!(response.body["_id"].is_string());
    assert!(response.body["createdAt"].is_string());
    assert!(response.body.get("passwordHash").is_none());
    assert!(response.body.get("password").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let ctx = TestContext::new();
    ctx.register("alice", "a@x.com", "pw").await;

    let response = ctx.register("alice2", "a@x.com", "other").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "Email already exists" }));
}

#[tokio::test]
async fn test_register_rejects_missing_fields() {
    let ctx = TestContext::new();

    let response = ctx
        .send("POST", "/register", None, Some(json!({ "email": "a@x.com" })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());

    let response = ctx.register("", "a@x.com", "pw").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({ "error": "Missing required field(s): username" })
    );
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new();
    ctx.register("alice", "a@x.com", "pw").await;

    let wrong_password = ctx.login("a@x.com", "nope").await;
    let unknown_email = ctx.login("b@x.com", "pw").await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, json!({ "error": "Authentication failed" }));
    assert_eq!(wrong_password.body, unknown_email.body);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let ctx = TestContext::new();

    for (method, uri) in [
        ("GET", "/todos"),
        ("POST", "/todos"),
        ("PUT", "/todos/00000000-0000-0000-0000-000000000000"),
        ("DELETE", "/todos/00000000-0000-0000-0000-000000000000"),
    ] {
        let response = ctx.send(method, uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(response.body, json!({ "error": "Unauthorized" }));
    }
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let ctx = TestContext::new();
    let (_, token) = ctx.signup("alice", "a@x.com").await;

    let response = ctx.send("GET", "/todos", Some("not-a-token"), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, json!({ "error": "Invalid token" }));

    let mut tampered = token.clone();
    tampered.push('x');
    let response = ctx.send("GET", "/todos", Some(&tampered), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, json!({ "error": "Invalid token" }));

    let foreign = TokenIssuer::new(&TokenConfig::new("another-secret-that-is-32-bytes-long!!"))
        .issue(Uuid::new_v4())
        .unwrap();
    let response = ctx.send("GET", "/todos", Some(&foreign), None).await;
    assert_eq!(response.body, json!({ "error": "Invalid token" }));
}

#[tokio::test]
async fn test_bearer_prefix_is_accepted() {
    let ctx = TestContext::new();
    let (_, token) = ctx.signup("alice", "a@x.com").await;

    let response = ctx
        .send("GET", "/todos", Some(&format!("Bearer {}", token)), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let ctx = TestContext::new();
    let now = Utc::now().timestamp();

    let expired = TokenIssuer::new(&TokenConfig::new(TEST_SECRET))
        .sign(&Claims {
            user_id: Uuid::new_v4(),
            iat: now - 120,
            exp: Some(now - 60),
        })
        .unwrap();

    let response = ctx.send("GET", "/todos", Some(&expired), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, json!({ "error": "Invalid token" }));
}

#[tokio::test]
async fn test_token_signed_with_previous_secret() {
    let old_secret = "old-secret-key-that-is-at-least-32-bytes";
    let ctx = TestContext::with_jwt(JwtConfig {
        secret: TEST_SECRET.to_string(),
        previous_secrets: vec![old_secret.to_string()],
        expires_in_seconds: Some(3600),
    });

    let token = TokenIssuer::new(&TokenConfig::new(old_secret))
        .issue(Uuid::new_v4())
        .unwrap();

    let response = ctx.send("GET", "/todos", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_todos_are_isolated_per_user() {
    let ctx = TestContext::new();
    let (_, alice) = ctx.signup("alice", "a@x.com").await;
    let (_, bob) = ctx.signup("bob", "b@x.com").await;

    let todo = ctx.create_todo(&alice, json!({ "todoTitle": "secret" })).await;
    let uri = format!("/todos/{}", todo["_id"].as_str().unwrap());

    let list = ctx.send("GET", "/todos", Some(&bob), None).await;
    assert_eq!(list.body, json!([]));

    let update = ctx
        .send("PUT", &uri, Some(&bob), Some(json!({ "completed": true })))
        .await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);
    assert_eq!(update.body, json!({ "error": "Todo not found" }));

    let delete = ctx.send("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);
    assert_eq!(delete.body, json!({ "error": "Todo not found" }));

    let list = ctx.send("GET", "/todos", Some(&alice), None).await;
    assert_eq!(list.body, json!([todo]));
}

#[tokio::test]
async fn test_create_ignores_user_id_in_body() {
    let ctx = TestContext::new();
    let (alice_id, alice) = ctx.signup("alice", "a@x.com").await;
    let (bob_id, _) = ctx.signup("bob", "b@x.com").await;

    let todo = ctx
        .create_todo(&alice, json!({ "todoTitle": "mine", "userId": bob_id }))
        .await;
    assert_eq!(todo["userId"], alice_id.as_str());
}

#[tokio::test]
async fn test_create_with_all_fields() {
    let ctx = TestContext::new();
    let (_, token) = ctx.signup("alice", "a@x.com").await;

    let todo = ctx
        .create_todo(
            &token,
            json!({
                "todoTitle": "file taxes",
                "description": "before the deadline",
                "dueDate": "2024-05-01",
                "completed": true,
            }),
        )
        .await;

    assert_eq!(todo["description"], "before the deadline");
    assert_eq!(todo["dueDate"], "2024-05-01T00:00:00Z");
    assert_eq!(todo["completed"], true);
}

#[tokio::test]
async fn test_create_rejects_bad_bodies() {
    let ctx = TestContext::new();
    let (_, token) = ctx.signup("alice", "a@x.com").await;

    let missing_title = ctx
        .send("POST", "/todos", Some(&token), Some(json!({ "completed": true })))
        .await;
    assert_eq!(missing_title.status, StatusCode::BAD_REQUEST);
    assert!(missing_title.body["error"].is_string());

    let bad_date = ctx
        .send(
            "POST",
            "/todos",
            Some(&token),
            Some(json!({ "todoTitle": "x", "dueDate": "someday" })),
        )
        .await;
    assert_eq!(bad_date.status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/todos")
        .header("authorization", token.as_str())
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let malformed = ctx.send_request(request).await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert!(malformed.body["error"].is_string());
}

#[tokio::test]
async fn test_update_completed_false_is_applied() {
    let ctx = TestContext::new();
    let (_, token) = ctx.signup("alice", "a@x.com").await;

    let todo = ctx
        .create_todo(&token, json!({ "todoTitle": "buy milk", "completed": true }))
        .await;
    let uri = format!("/todos/{}", todo["_id"].as_str().unwrap());

    let response = ctx
        .send("PUT", &uri, Some(&token), Some(json!({ "completed": false })))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["completed"], false);
    assert_eq!(response.body["todoTitle"], "buy milk");
    assert_eq!(response.body["_id"], todo["_id"]);
}

#[tokio::test]
async fn test_update_applies_present_fields_only() {
    let ctx = TestContext::new();
    let (_, token) = ctx.signup("alice", "a@x.com").await;

    let todo = ctx
        .create_todo(
            &token,
            json!({
                "todoTitle": "buy milk",
                "description": "2 litres",
                "dueDate": "2024-05-01T09:30:00Z",
            }),
        )
        .await;
    let uri = format!("/todos/{}", todo["_id"].as_str().unwrap());

    let response = ctx
        .send(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "todoTitle": "", "description": null })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["todoTitle"], "");
    assert!(response.body.get("description").is_none());
    assert_eq!(response.body["dueDate"], "2024-05-01T09:30:00Z");
    assert_eq!(response.body["completed"], false);

    let list = ctx.send("GET", "/todos", Some(&token), None).await;
    assert_eq!(list.body, json!([response.body]));
}

#[tokio::test]
async fn test_update_unknown_or_malformed_id() {
    let ctx = TestContext::new();
    let (_, token) = ctx.signup("alice", "a@x.com").await;

    for uri in [format!("/todos/{}", Uuid::new_v4()), "/todos/not-an-id".to_string()] {
        let update = ctx
            .send("PUT", &uri, Some(&token), Some(json!({ "completed": true })))
            .await;
        assert_eq!(update.status, StatusCode::NOT_FOUND);
        assert_eq!(update.body, json!({ "error": "Todo not found" }));

        let delete = ctx.send("DELETE", &uri, Some(&token), None).await;
        assert_eq!(delete.status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();

    let response = ctx.send("GET", "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["storage"], "memory");
    assert_eq!(response.body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_storage_failures_return_endpoint_messages() {
    let ctx = TestContext::with_failing_store();
    let token = TokenIssuer::new(&TokenConfig::new(TEST_SECRET))
        .issue(Uuid::new_v4())
        .unwrap();
    let todo_uri = format!("/todos/{}", Uuid::new_v4());

    let register = ctx.register("alice", "a@x.com", "pw").await;
    assert_eq!(register.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(register.body, json!({ "error": "Error registering user" }));

    let login = ctx.login("a@x.com", "pw").await;
    assert_eq!(login.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(login.body, json!({ "error": "Error logging in" }));

    let list = ctx.send("GET", "/todos", Some(&token), None).await;
    assert_eq!(list.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(list.body, json!({ "error": "Error fetching todos" }));

    let create = ctx
        .send("POST", "/todos", Some(&token), Some(json!({ "todoTitle": "x" })))
        .await;
    assert_eq!(create.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(create.body, json!({ "error": "Error creating todo" }));

    let update = ctx
        .send("PUT", &todo_uri, Some(&token), Some(json!({ "completed": true })))
        .await;
    assert_eq!(update.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(update.body, json!({ "error": "Error updating todo" }));

    let delete = ctx.send("DELETE", &todo_uri, Some(&token), None).await;
    assert_eq!(delete.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(delete.body, json!({ "error": "Error deleting todo" }));
}

#[tokio::test]
async fn test_health_degraded_when_storage_fails() {
    let ctx = TestContext::with_failing_store();

    let response = ctx.send("GET", "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "degraded");
    assert_eq!(response.body["storage"], "failing");
}

#[tokio::test]
async fn test_empty_bearer_header_is_unauthorized() {
    let ctx = TestContext::new();

    for header in ["Bearer ", "Bearer"] {
        let response = ctx.send("GET", "/todos", Some(header), None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body, json!({ "error": "Unauthorized" }));
    }
}
