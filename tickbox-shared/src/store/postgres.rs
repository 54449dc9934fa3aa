/// PostgreSQL storage backend
///
/// Each trait method is a single SQL statement. Ownership is part of every
/// todo `WHERE` clause, so a row owned by another user is never read or
/// written.
///
/// Tables are created by the migrations in `tickbox-shared/migrations/`
/// (see [`crate::db::migrations`]).
///
/// # Example
///
/// ```no_run
/// use tickbox_shared::db::pool::{create_pool, DatabaseConfig};
/// use tickbox_shared::store::{postgres::PgStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgStore::new(pool);
/// let user = store.find_user_by_email("a@x.com").await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult, TodoStore, UserStore};
use crate::models::{
    todo::{CreateTodo, Todo, UpdateTodo},
    user::{CreateUser, User},
};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

const TODO_COLUMNS: &str =
    "id, todo_title, description, due_date, completed, user_id, created_at, updated_at";

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps a unique-index violation on insert to `DuplicateEmail`
fn map_insert_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::DuplicateEmail,
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        let user = User::new(data);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        debug!(user_id = %user.id, "Inserted user");
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn list_todos(&self, owner: Uuid) -> StoreResult<Vec<Todo>> {
        let todos = sqlx::query_as::<_, Todo>(&format!(
            r#"
            SELECT {TODO_COLUMNS}
            FROM todos
            WHERE user_id = $1
            ORDER BY created_at, id
            "#
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    async fn insert_todo(&self, data: CreateTodo) -> StoreResult<Todo> {
        let todo = Todo::new(data);

        let todo = sqlx::query_as::<_, Todo>(&format!(
            r#"
            INSERT INTO todos (id, todo_title, description, due_date, completed, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(todo.id)
        .bind(&todo.todo_title)
        .bind(&todo.description)
        .bind(todo.due_date)
        .bind(todo.completed)
        .bind(todo.user_id)
        .bind(todo.created_at)
        .bind(todo.updated_at)
        .fetch_one(&self.pool)
        .await?;

        debug!(todo_id = %todo.id, user_id = %todo.user_id, "Inserted todo");
        Ok(todo)
    }

    async fn update_todo(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: &UpdateTodo,
    ) -> StoreResult<Option<Todo>> {
        // Nullable columns carry an explicit "present" flag so that a
        // supplied null clears the value while an absent field keeps it.
        let todo = sqlx::query_as::<_, Todo>(&format!(
            r#"
            UPDATE todos SET
                todo_title  = COALESCE($3, todo_title),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                due_date    = CASE WHEN $6 THEN $7 ELSE due_date END,
                completed   = COALESCE($8, completed),
                updated_at  = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner)
        .bind(&changes.todo_title)
        .bind(changes.description.is_some())
        .bind(changes.description.clone().flatten())
        .bind(changes.due_date.is_some())
        .bind(changes.due_date.flatten())
        .bind(changes.completed)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn delete_todo(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }
}
