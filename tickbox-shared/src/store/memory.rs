/// In-memory storage backend
///
/// Keeps users and todos in process memory behind a single `RwLock`. Data is
/// lost on restart. Used for local development (`STORAGE_BACKEND=memory`) and
/// the API integration tests.
///
/// Email uniqueness is checked and the user inserted under the same write
/// lock, so concurrent registrations with one email cannot both succeed.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult, TodoStore, UserStore};
use crate::models::{
    todo::{CreateTodo, Todo, UpdateTodo},
    user::{CreateUser, User},
};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    /// email -> user id
    emails: HashMap<String, Uuid>,
    /// Insertion order
    todos: Vec<Todo>,
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;

        if inner.emails.contains_key(&data.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let user = User::new(data);
        inner.emails.insert(user.email.clone(), user.id);
        inner.users.insert(user.id, user.clone());

        debug!(user_id = %user.id, "Inserted user");
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;

        Ok(inner
            .emails
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list_todos(&self, owner: Uuid) -> StoreResult<Vec<Todo>> {
        let inner = self.inner.read().await;

        Ok(inner
            .todos
            .iter()
            .filter(|todo| todo.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn insert_todo(&self, data: CreateTodo) -> StoreResult<Todo> {
        let todo = Todo::new(data);
        self.inner.write().await.todos.push(todo.clone());

        debug!(todo_id = %todo.id, user_id = %todo.user_id, "Inserted todo");
        Ok(todo)
    }

    async fn update_todo(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: &UpdateTodo,
    ) -> StoreResult<Option<Todo>> {
        let mut inner = self.inner.write().await;

        let updated = inner
            .todos
            .iter_mut()
            .find(|todo| todo.id == id && todo.is_owned_by(owner))
            .map(|todo| {
                changes.apply_to(todo);
                todo.clone()
            });

        Ok(updated)
    }

    async fn delete_todo(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;

        let before = inner.todos.len();
        inner
            .todos
            .retain(|todo| !(todo.id == id && todo.is_owned_by(owner)));

        Ok(inner.todos.len() < before)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
