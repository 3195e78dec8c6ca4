//! SQLite-backed store
//!
//! Users and todos live in one database. Timestamps are stored as RFC 3339
//! text with fixed microsecond precision so that lexical order matches
//! chronological order.

use super::{StoreError, TodoStore, UserStore};
use crate::core::models::{NewTodo, NewUser, OwnedMutation, Todo, TodoPatch, User};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

pub struct SqliteStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TodoRow {
    id: String,
    title: String,
    description: Option<String>,
    status: String,
    user_id: String,
    created_at: String,
}

impl TryFrom<TodoRow> for Todo {
    type Error = StoreError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        Ok(Todo {
            created_at: parse_timestamp(&row.created_at)?,
            id: row.id,
            title: row.title,
            description: row.description,
            status: row.status,
            user_id: row.user_id,
        })
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";
const TODO_COLUMNS: &str = "id, title, description, status, user_id, created_at";

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp {:?}: {}", raw, e)))
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

impl SqliteStore {
    /// Open (creating if missing) the database at `database_url` and make sure
    /// the tables exist.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool_options = if is_in_memory(database_url) {
            // Every connection to `:memory:` opens its own empty database, so the
            // pool holds exactly one and never recycles it.
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options.connect_with(options).await?;

        let store = Self { pool };
        store.init_db().await?;

        info!("[Store] Initialized at {}", database_url);
        Ok(store)
    }

    async fn init_db(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'todo',
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_todos_user ON todos (user_id, created_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Tells a failed guarded mutation apart: missing row vs. someone else's row.
    async fn classify_miss<T>(&self, id: &str) -> Result<OwnedMutation<T>, StoreError> {
        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM todos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match exists {
            Some(_) => OwnedMutation::NotOwner,
            None => OwnedMutation::NotFound,
        })
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let now = now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(format_timestamp(user.created_at))
        .bind(format_timestamp(user.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl TodoStore for SqliteStore {
    async fn list_todos(&self, owner: &str) -> Result<Vec<Todo>, StoreError> {
        let rows: Vec<TodoRow> = sqlx::query_as(&format!(
            "SELECT {} FROM todos WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
            TODO_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Todo::try_from).collect()
    }

    async fn insert_todo(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let todo = Todo {
            id: Uuid::new_v4().to_string(),
            title: todo.title,
            description: todo.description,
            status: todo.status,
            user_id: todo.user_id,
            created_at: now(),
        };

        sqlx::query(
            "INSERT INTO todos (id, title, description, status, user_id, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&todo.id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(&todo.status)
        .bind(&todo.user_id)
        .bind(format_timestamp(todo.created_at))
        .execute(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn update_todo_if_owner(
        &self,
        id: &str,
        owner: &str,
        patch: TodoPatch,
    ) -> Result<OwnedMutation<Todo>, StoreError> {
        let row: Option<TodoRow> = sqlx::query_as(&format!(
            r#"
            UPDATE todos
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                status = COALESCE(?, status)
            WHERE id = ? AND user_id = ?
            RETURNING {}
            "#,
            TODO_COLUMNS
        ))
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.status)
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(OwnedMutation::Applied(Todo::try_from(row)?)),
            None => self.classify_miss(id).await,
        }
    }

    async fn delete_todo_if_owner(
        &self,
        id: &str,
        owner: &str,
    ) -> Result<OwnedMutation<()>, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            Ok(OwnedMutation::Applied(()))
        } else {
            self.classify_miss(id).await
        }
    }
}
