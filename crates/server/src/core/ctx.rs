//! Request identity.
//!
//! `mw_require_auth` verifies the token and stores a `Ctx` in the request
//! extensions; protected handlers take `Ctx` as an argument to learn whose
//! todos they are touching. A handler reached without the middleware gets
//! a 500, since that is a routing mistake rather than a client error.

use crate::core::error::Error;
use axum::{extract::FromRequestParts, http::request::Parts};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctx {
    user_id: String,
}

impl Ctx {
    /// Context for the token subject `user_id`.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Ctx {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Error> {
        match parts.extensions.get::<Ctx>() {
            Some(ctx) => Ok(ctx.clone()),
            None => Err(Error::AuthFailCtxNotInRequestExt),
        }
    }
}
