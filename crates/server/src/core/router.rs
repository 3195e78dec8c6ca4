//! Core Router
//!
//! Public auth routes plus everything behind `mw_require_auth`.

use crate::core::auth::handlers as auth_handlers;
use crate::core::auth::middleware::mw_require_auth;
use crate::core::AppState;
use crate::todos::handlers as todo_handlers;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/user", get(auth_handlers::me))
        .route("/api/auth/me", get(auth_handlers::me))
        .route(
            "/api/todos",
            get(todo_handlers::list_todos).post(todo_handlers::create_todo),
        )
        .route(
            "/api/todos/{id}",
            put(todo_handlers::update_todo).delete(todo_handlers::delete_todo),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw_require_auth,
        ));

    Router::new()
        .route("/api/auth/register", post(auth_handlers::register))
        .route("/api/auth/login", post(auth_handlers::login))
        .route("/health", get(health_check))
        .merge(protected)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK - Todo Server"
}
