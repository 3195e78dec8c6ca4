use super::{CreateTodoRequest, UpdateTodoRequest};
use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::Result;
use crate::core::extract::JsonBody;
use crate::core::models::Todo;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct MsgResponse {
    pub msg: &'static str,
}

/// GET /api/todos
pub async fn list_todos(State(state): State<AppState>, ctx: Ctx) -> Result<Json<Vec<Todo>>> {
    let todos = state.todos.list(ctx.user_id()).await?;
    Ok(Json(todos))
}

/// POST /api/todos
pub async fn create_todo(
    State(state): State<AppState>,
    ctx: Ctx,
    JsonBody(req): JsonBody<CreateTodoRequest>,
) -> Result<Json<Todo>> {
    info!("POST /api/todos - {}", ctx.user_id());
    let todo = state.todos.create(ctx.user_id(), req).await?;
    Ok(Json(todo))
}

/// PUT /api/todos/{id}
pub async fn update_todo(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(todo_id): Path<String>,
    JsonBody(req): JsonBody<UpdateTodoRequest>,
) -> Result<Json<Todo>> {
    info!("PUT /api/todos/{} - {}", todo_id, ctx.user_id());
    let todo = state.todos.update(ctx.user_id(), &todo_id, req).await?;
    Ok(Json(todo))
}

/// DELETE /api/todos/{id}
pub async fn delete_todo(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(todo_id): Path<String>,
) -> Result<Json<MsgResponse>> {
    info!("DELETE /api/todos/{} - {}", todo_id, ctx.user_id());
    state.todos.delete(ctx.user_id(), &todo_id).await?;
    Ok(Json(MsgResponse { msg: "Todo removed" }))
}
