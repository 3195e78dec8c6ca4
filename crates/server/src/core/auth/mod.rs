//! Authentication Module
//!
//! Handles registration, login, and lookup of the current user. Passwords are
//! bcrypt-hashed before they reach the store and never logged; successful
//! registrations and logins answer with a signed token from `TokenService`.

pub mod handlers;
pub mod middleware;
pub mod password;
pub mod token;

use crate::core::error::{Error, Result};
use crate::core::models::{NewUser, UserInfo};
use crate::core::store::{StoreError, UserStore};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use token::TokenService;
use tracing::{info, warn};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_NAME_LEN: usize = 3;

const REGISTER_FAILED: &str = "Server error during registration";
const LOGIN_FAILED: &str = "Server error during login";
const LOOKUP_FAILED: &str = "Server error";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// Body of `POST /api/auth/register`. Missing fields are reported by the service.
#[derive(Deserialize, Default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

/// Registration and login on top of a user store and the token service.
pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>, bcrypt_cost: u32) -> Self {
        Self {
            users,
            tokens,
            bcrypt_cost,
        }
    }

    /// Register a new user and return a token for them
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthToken> {
        let (name, email, password) = match (
            present(req.name),
            present(req.email),
            present(req.password),
        ) {
            (Some(name), Some(email), Some(password)) => (name, email, password),
            _ => return Err(Error::MissingFields),
        };

        if !is_valid_email(&email) {
            return Err(Error::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::PasswordTooShort);
        }
        let name = name.trim().to_string();
        if name.chars().count() < MIN_NAME_LEN {
            return Err(Error::NameTooShort);
        }

        let email = email.to_lowercase();

        let existing = self
            .users
            .find_user_by_email(&email)
            .await
            .map_err(|e| Error::internal(REGISTER_FAILED, e))?;
        if existing.is_some() {
            return Err(Error::UserExists);
        }

        let password_hash = password::hash_password(password, self.bcrypt_cost)
            .await
            .map_err(|e| Error::internal(REGISTER_FAILED, e))?;

        // A concurrent registration can still win the race past the lookup.
        let user = match self
            .users
            .insert_user(NewUser {
                name,
                email,
                password_hash,
            })
            .await
        {
            Ok(user) => user,
            Err(StoreError::DuplicateKey) => return Err(Error::EmailTaken),
            Err(e) => return Err(Error::internal(REGISTER_FAILED, e)),
        };

        info!("[Auth] User registered: {} ({})", user.name, user.email);

        self.issue(&user.id)
    }

    /// Check credentials and return a token
    pub async fn login(&self, req: LoginRequest) -> Result<AuthToken> {
        let (email, password) = match (present(req.email), present(req.password)) {
            (Some(email), Some(password)) => (email, password),
            _ => return Err(Error::MissingFields),
        };

        let email = email.to_lowercase();

        let user = self
            .users
            .find_user_by_email(&email)
            .await
            .map_err(|e| Error::internal(LOGIN_FAILED, e))?;

        let Some(user) = user else {
            warn!("[Auth] Failed login attempt for {}", email);
            return Err(Error::InvalidCredentials);
        };

        let valid = password::verify_password(password, user.password_hash.clone())
            .await
            .map_err(|e| Error::internal(LOGIN_FAILED, e))?;
        if !valid {
            warn!("[Auth] Failed login attempt for {}", email);
            return Err(Error::InvalidCredentials);
        }

        info!("[Auth] User logged in: {}", user.email);

        self.issue(&user.id)
    }

    /// The user behind a verified token, without the password hash.
    ///
    /// A token can outlive its user record; that case yields `None` rather
    /// than an error.
    pub async fn current_user(&self, user_id: &str) -> Result<Option<UserInfo>> {
        let user = self
            .users
            .find_user_by_id(user_id)
            .await
            .map_err(|e| Error::internal(LOOKUP_FAILED, e))?;

        Ok(user.map(UserInfo::from))
    }

    fn issue(&self, user_id: &str) -> Result<AuthToken> {
        let token = self.tokens.issue(user_id).map_err(Error::TokenSigning)?;
        Ok(AuthToken { token })
    }
}
