use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::Result;
use crate::core::models::UserInfo;
use axum::extract::State;
use axum::Json;

/// GET /api/auth/user and GET /api/auth/me
///
/// Answers `null` when the token is valid but the user record is gone.
pub async fn me(State(state): State<AppState>, ctx: Ctx) -> Result<Json<Option<UserInfo>>> {
    let user = state.accounts.current_user(ctx.user_id()).await?;

    Ok(Json(user))
}
