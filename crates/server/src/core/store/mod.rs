//! Persistence
//!
//! The services only see the `UserStore` and `TodoStore` traits. `SqliteStore`
//! implements both on top of a single sqlx pool.

pub mod sqlite;

use crate::core::models::{NewTodo, NewUser, OwnedMutation, Todo, TodoPatch, User};
use async_trait::async_trait;

pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. an email registered twice).
    #[error("duplicate key")]
    DuplicateKey,
    /// A foreign key rejected the write (a todo for a user that no longer exists).
    #[error("unknown owner")]
    UnknownOwner,
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateKey,
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                StoreError::UnknownOwner
            }
            _ => StoreError::Database(err),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact match; callers normalise the email first.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Fails with `StoreError::DuplicateKey` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All todos of `owner`, newest first.
    async fn list_todos(&self, owner: &str) -> Result<Vec<Todo>, StoreError>;

    /// Fails with `StoreError::UnknownOwner` when `todo.user_id` has no user.
    async fn insert_todo(&self, todo: NewTodo) -> Result<Todo, StoreError>;

    /// Applies `patch` only if the todo exists and belongs to `owner`, as one
    /// store operation.
    async fn update_todo_if_owner(
        &self,
        id: &str,
        owner: &str,
        patch: TodoPatch,
    ) -> Result<OwnedMutation<Todo>, StoreError>;

    /// Deletes only if the todo exists and belongs to `owner`, as one store
    /// operation.
    async fn delete_todo_if_owner(
        &self,
        id: &str,
        owner: &str,
    ) -> Result<OwnedMutation<()>, StoreError>;
}
