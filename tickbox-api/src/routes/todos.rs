/// Todo endpoints
///
/// Every handler runs behind the authentication layer and only ever sees the
/// caller's own todos. A todo owned by another user answers exactly like a
/// missing one.
///
/// # Endpoints
///
/// - `GET /todos` - List own todos
/// - `POST /todos` - Create a todo
/// - `PUT /todos/:id` - Partially update a todo
/// - `DELETE /todos/:id` - Delete a todo

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tickbox_shared::{
    auth::middleware::AuthContext,
    models::todo::{CreateTodo, DueDate, Todo, UpdateTodo},
    store::TodoStore,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Create todo request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    /// Title (required)
    pub todo_title: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Optional due date (`YYYY-MM-DD` or RFC 3339)
    #[serde(default)]
    pub due_date: Option<DueDate>,

    /// Completion flag (defaults to false)
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Delete response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Confirmation message
    pub message: String,
}

const TODO_NOT_FOUND: &str = "Todo not found";

/// Lists the caller's todos, oldest first
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `500 Internal Server Error`: `{"error": "Error fetching todos"}`
pub async fn list_todos(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<Todo>>> {
    let todos = state
        .store
        .list_todos(auth.user_id)
        .await
        .map_err(|e| ApiError::internal("Error fetching todos", e))?;

    debug!(user_id = %auth.user_id, count = todos.len(), "Listed todos");
    Ok(Json(todos))
}

/// Creates a todo owned by the caller
///
/// # Endpoint
///
/// ```text
/// POST /todos
/// authorization: <token>
/// Content-Type: application/json
///
/// {
///   "todoTitle": "buy milk",
///   "description": "2 litres",
///   "dueDate": "2024-05-01",
///   "completed": false
/// }
/// ```
///
/// Any `userId` in the body is ignored; the owner is always the caller.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body or missing `todoTitle`
/// - `401 Unauthorized`: Missing or invalid token
/// - `500 Internal Server Error`: `{"error": "Error creating todo"}`
pub async fn create_todo(
    State(state): State<AppState>,
    auth: AuthContext,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> ApiResult<Json<Todo>> {
    let Json(req) = payload?;

    let todo = state
        .store
        .insert_todo(CreateTodo {
            user_id: auth.user_id,
            todo_title: req.todo_title,
            description: req.description,
            due_date: req.due_date,
            completed: req.completed.unwrap_or(false),
        })
        .await
        .map_err(|e| ApiError::internal("Error creating todo", e))?;

    info!(user_id = %auth.user_id, todo_id = %todo.id, "Todo created");
    Ok(Json(todo))
}

/// Applies the fields present in the body to one of the caller's todos
///
/// # Endpoint
///
/// ```text
/// PUT /todos/:id
/// authorization: <token>
/// Content-Type: application/json
///
/// { "completed": true }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: `{"error": "Todo not found"}` for an unknown, foreign,
///   or malformed ID
/// - `500 Internal Server Error`: `{"error": "Error updating todo"}`
pub async fn update_todo(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> ApiResult<Json<Todo>> {
    let id = parse_todo_id(&id)?;
    let Json(changes) = payload?;

    let todo = state
        .store
        .update_todo(auth.user_id, id, &changes)
        .await
        .map_err(|e| ApiError::internal("Error updating todo", e))?
        .ok_or_else(|| ApiError::NotFound(TODO_NOT_FOUND.to_string()))?;

    info!(user_id = %auth.user_id, todo_id = %todo.id, "Todo updated");
    Ok(Json(todo))
}

/// Deletes one of the caller's todos
///
/// # Response
///
/// ```json
/// { "message": "Todo deleted successfully" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: `{"error": "Todo not found"}`
/// - `500 Internal Server Error`: `{"error": "Error deleting todo"}`
pub async fn delete_todo(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_todo_id(&id)?;

    let deleted = state
        .store
        .delete_todo(auth.user_id, id)
        .await
        .map_err(|e| ApiError::internal("Error deleting todo", e))?;

    if !deleted {
        return Err(ApiError::NotFound(TODO_NOT_FOUND.to_string()));
    }

    info!(user_id = %auth.user_id, todo_id = %id, "Todo deleted");
    Ok(Json(MessageResponse {
        message: "Todo deleted successfully".to_string(),
    }))
}

/// A malformed ID cannot name an existing todo
fn parse_todo_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(TODO_NOT_FOUND.to_string()))
}
