/// Todo model
///
/// A todo belongs to exactly one user. Ownership is not a foreign key: every
/// query filters on `user_id` so one user can never see or touch another
/// user's todos.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE todos (
///     id UUID PRIMARY KEY,
///     user_id UUID NOT NULL,
///     todo_title TEXT NOT NULL,
///     description TEXT,
///     due_date TIMESTAMPTZ,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// CREATE INDEX idx_todos_user_id ON todos (user_id, created_at);
/// ```
///
/// # Partial updates
///
/// [`UpdateTodo`] tracks which fields were present in the request body rather
/// than whether they are truthy. `{"completed": false}` and
/// `{"todoTitle": ""}` are applied; `{"description": null}` clears the
/// description; absent fields keep their stored value.
///
/// # Example
///
/// ```
/// use tickbox_shared::models::todo::{CreateTodo, Todo, UpdateTodo};
/// use uuid::Uuid;
///
/// let mut todo = Todo::new(CreateTodo {
///     user_id: Uuid::new_v4(),
///     todo_title: "buy milk".to_string(),
///     description: None,
///     due_date: None,
///     completed: true,
/// });
///
/// let changes: UpdateTodo = serde_json::from_str(r#"{"completed": false}"#).unwrap();
/// changes.apply_to(&mut todo);
/// assert!(!todo.completed);
/// assert_eq!(todo.todo_title, "buy milk");
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Todo record
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique todo ID (UUID v4)
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Title
    pub todo_title: String,

    /// Optional free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Optional due date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DueDate>,

    /// Whether the todo is done
    pub completed: bool,

    /// Owning user
    pub user_id: Uuid,

    /// When the todo was created
    pub created_at: DateTime<Utc>,

    /// When the todo was last modified
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a todo
#[derive(Debug, Clone)]
pub struct CreateTodo {
    pub user_id: Uuid,
    pub todo_title: String,
    pub description: Option<String>,
    pub due_date: Option<DueDate>,
    pub completed: bool,
}

/// Partial update of a todo
///
/// Deserialized straight from a request body. Unknown fields (including
/// `userId` and `_id`) are ignored, so ownership cannot be reassigned.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    /// New title (`null` keeps the stored title)
    #[serde(default)]
    pub todo_title: Option<String>,

    /// New description (use Some(None) to clear)
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,

    /// New due date (use Some(None) to clear)
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<DueDate>>,

    /// New completion flag (`null` keeps the stored flag)
    #[serde(default)]
    pub completed: Option<bool>,
}

impl Todo {
    /// Builds a new todo with a fresh ID and timestamps
    pub fn new(data: CreateTodo) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            todo_title: data.todo_title,
            description: data.description,
            due_date: data.due_date,
            completed: data.completed,
            user_id: data.user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks whether `user_id` owns this todo
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

impl UpdateTodo {
    /// Overwrites every supplied field on `todo` and bumps `updated_at`
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(title) = &self.todo_title {
            todo.todo_title = title.clone();
        }
        if let Some(description) = &self.description {
            todo.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            todo.due_date = due_date;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        todo.updated_at = Utc::now();
    }
}

/// Marks a field as present even when its value is `null`
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Due date of a todo
///
/// Accepts either a calendar date (`2024-05-01`, read as midnight UTC) or a
/// full RFC 3339 timestamp. Serialized as RFC 3339 in UTC with a `Z` suffix
/// (`2024-05-01T00:00:00Z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct DueDate(pub DateTime<Utc>);

/// Error parsing a due date
#[derive(Debug, thiserror::Error)]
#[error("Invalid due date '{0}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
pub struct DueDateError(String);

impl FromStr for DueDate {
    type Err = DueDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Ok(DueDate(ts.with_timezone(&Utc)));
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| DueDate(naive.and_utc()))
            .ok_or_else(|| DueDateError(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for DueDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
