/// Storage layer for users and todos
///
/// Handlers talk to storage through the [`UserStore`] and [`TodoStore`]
/// traits so the same code runs against PostgreSQL in production and an
/// in-memory map in development and tests.
///
/// # Backends
///
/// - [`postgres::PgStore`]: sqlx-backed, one statement per operation
/// - [`memory::MemoryStore`]: `RwLock`-guarded maps, nothing persisted to disk
///
/// # Ownership
///
/// Every todo operation takes the caller's user ID and only matches rows owned
/// by that user. A todo owned by someone else is indistinguishable from one
/// that does not exist: `update_todo` returns `None` and `delete_todo` returns
/// `false` in both cases.
///
/// # Example
///
/// ```
/// use tickbox_shared::models::todo::CreateTodo;
/// use tickbox_shared::store::{memory::MemoryStore, TodoStore};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let owner = Uuid::new_v4();
///
/// store.insert_todo(CreateTodo {
///     user_id: owner,
///     todo_title: "buy milk".to_string(),
///     description: None,
///     due_date: None,
///     completed: false,
/// }).await?;
///
/// assert_eq!(store.list_todos(owner).await?.len(), 1);
/// assert!(store.list_todos(Uuid::new_v4()).await?.is_empty());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    todo::{CreateTodo, Todo, UpdateTodo},
    user::{CreateUser, User},
};

pub mod memory;
pub mod postgres;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A user with this email already exists
    #[error("Email already exists")]
    DuplicateEmail,

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateEmail` if the email is taken
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Finds a user by exact email
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

/// Persistence for todos, scoped by owner
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Lists every todo owned by `owner`, oldest first
    async fn list_todos(&self, owner: Uuid) -> StoreResult<Vec<Todo>>;

    /// Persists a new todo
    async fn insert_todo(&self, data: CreateTodo) -> StoreResult<Todo>;

    /// Applies `changes` to the todo `id` if `owner` owns it
    ///
    /// Returns the updated todo, or `None` if no such todo is owned by `owner`.
    async fn update_todo(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: &UpdateTodo,
    ) -> StoreResult<Option<Todo>>;

    /// Deletes the todo `id` if `owner` owns it
    ///
    /// Returns true if a todo was removed.
    async fn delete_todo(&self, owner: Uuid, id: Uuid) -> StoreResult<bool>;
}

/// A complete storage backend
#[async_trait]
pub trait Store: UserStore + TodoStore {
    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Checks that the backend is reachable
    async fn ping(&self) -> StoreResult<()>;
}
