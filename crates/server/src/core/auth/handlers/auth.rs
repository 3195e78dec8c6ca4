//! Auth handlers

use crate::core::auth::{AuthToken, LoginRequest, RegisterRequest};
use crate::core::config::AppState;
use crate::core::error::Result;
use crate::core::extract::JsonBody;
use axum::{extract::State, Json};
use tracing::info;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<Json<AuthToken>> {
    info!(
        "POST /api/auth/register - {}",
        req.email.as_deref().unwrap_or("<missing>")
    );

    let token = state.accounts.register(req).await?;

    Ok(Json(token))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<AuthToken>> {
    info!(
        "POST /api/auth/login - {}",
        req.email.as_deref().unwrap_or("<missing>")
    );

    let token = state.accounts.login(req).await?;

    Ok(Json(token))
}
