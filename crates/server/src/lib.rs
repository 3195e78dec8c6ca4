//! Todo Server Library
//!
//! Account registration and login with bcrypt-hashed passwords and signed
//! tokens, plus per-user todo CRUD behind a token-checking middleware.

pub mod core;
pub mod todos;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use crate::core::{router, AppState, Error, ServerConfig};

/// Install the global tracing subscriber; a second call is a no-op.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "todo_server=debug,tower_http=info,info".into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("=== Todo Server ===");

    let config = ServerConfig::from_env().context("Invalid configuration")?;
    info!("Config: {:?}", config);

    let state = AppState::connect(&config)
        .await
        .context("Failed to open store")?;
    info!("Store ready at {}", config.database_url);

    let app = router(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Todo Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
