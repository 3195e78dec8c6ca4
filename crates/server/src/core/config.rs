//! Server configuration

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::core::auth::password::DEFAULT_BCRYPT_COST;
use crate::core::auth::token::TokenService;
use crate::core::auth::AccountService;
use crate::core::store::{SqliteStore, StoreError, TodoStore, UserStore};
use crate::todos::TodoService;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todos.sqlite";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Configuration for the Todo Server, read once at startup
#[derive(Clone)]
pub struct ServerConfig {
    /// Token signing secret
    pub jwt_secret: String,
    /// Store connection string
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("jwt_secret", &"<redacted>")
            .field("database_url", &self.database_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl ServerConfig {
    /// Config with defaults for everything but the secret
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }

    /// Read `JWT_SECRET`, `DATABASE_URL`, `HOST`, `PORT` and `BCRYPT_COST`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let mut config = Self::new(jwt_secret);

        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(cost) = lookup("BCRYPT_COST") {
            config.bcrypt_cost = cost
                .parse()
                .ok()
                .filter(|c| (4..=31).contains(c))
                .ok_or_else(|| ConfigError::Invalid {
                    name: "BCRYPT_COST",
                    value: cost.clone(),
                })?;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: "HOST",
                value: self.host.clone(),
            })
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub accounts: Arc<AccountService>,
    pub todos: Arc<TodoService>,
}

impl AppState {
    pub fn new(
        config: &ServerConfig,
        users: Arc<dyn UserStore>,
        todos: Arc<dyn TodoStore>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(config.jwt_secret.as_bytes()));

        Self {
            accounts: Arc::new(AccountService::new(
                users,
                tokens.clone(),
                config.bcrypt_cost,
            )),
            todos: Arc::new(TodoService::new(todos)),
            tokens,
        }
    }

    /// Open the SQLite store named by the config and wire the services to it.
    pub async fn connect(config: &ServerConfig) -> Result<Self, StoreError> {
        let store = Arc::new(SqliteStore::connect(&config.database_url).await?);
        Ok(Self::new(config, store.clone(), store))
    }
}
