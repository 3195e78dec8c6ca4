//! Todos
//!
//! Per-user CRUD. Every operation runs for the identity the auth middleware
//! attached; updates and deletes go through the store's owner-guarded
//! operations so the ownership check and the write cannot be separated.

pub mod handlers;

use crate::core::error::{Error, Result};
use crate::core::models::{NewTodo, OwnedMutation, Todo, TodoPatch, DEFAULT_TODO_STATUS};
use crate::core::store::{StoreError, TodoStore};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

const TODO_FAILED: &str = "Server error";

#[derive(Debug, Deserialize, Default)]
pub struct CreateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl From<UpdateTodoRequest> for TodoPatch {
    /// Empty strings count as omitted.
    fn from(req: UpdateTodoRequest) -> Self {
        let keep = |field: Option<String>| field.filter(|value| !value.is_empty());
        TodoPatch {
            title: keep(req.title),
            description: keep(req.description),
            status: keep(req.status),
        }
    }
}

pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// Todos owned by `user_id`, newest first
    pub async fn list(&self, user_id: &str) -> Result<Vec<Todo>> {
        self.store
            .list_todos(user_id)
            .await
            .map_err(|e| Error::internal(TODO_FAILED, e))
    }

    pub async fn create(&self, user_id: &str, req: CreateTodoRequest) -> Result<Todo> {
        let title = req
            .title
            .filter(|title| !title.trim().is_empty())
            .ok_or(Error::TitleRequired)?;

        let todo = self
            .store
            .insert_todo(NewTodo {
                user_id: user_id.to_string(),
                title,
                description: req.description,
                status: DEFAULT_TODO_STATUS.to_string(),
            })
            .await
            .map_err(|e| match e {
                StoreError::UnknownOwner => Error::AuthFailUnknownUser,
                other => Error::internal(TODO_FAILED, other),
            })?;

        debug!("[Todos] {} created {}", user_id, todo.id);
        Ok(todo)
    }

    pub async fn update(
        &self,
        user_id: &str,
        todo_id: &str,
        req: UpdateTodoRequest,
    ) -> Result<Todo> {
        let outcome = self
            .store
            .update_todo_if_owner(todo_id, user_id, TodoPatch::from(req))
            .await
            .map_err(|e| Error::internal(TODO_FAILED, e))?;

        match outcome {
            OwnedMutation::Applied(todo) => Ok(todo),
            OwnedMutation::NotFound => Err(Error::TodoNotFound),
            OwnedMutation::NotOwner => Err(Error::NotOwner),
        }
    }

    pub async fn delete(&self, user_id: &str, todo_id: &str) -> Result<()> {
        let outcome = self
            .store
            .delete_todo_if_owner(todo_id, user_id)
            .await
            .map_err(|e| Error::internal(TODO_FAILED, e))?;

        match outcome {
            OwnedMutation::Applied(()) => {
                debug!("[Todos] {} deleted {}", user_id, todo_id);
                Ok(())
            }
            OwnedMutation::NotFound => Err(Error::TodoNotFound),
            OwnedMutation::NotOwner => Err(Error::NotOwner),
        }
    }
}
