use crate::core::auth::token::TokenError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Validation Errors
    #[error("Please enter all fields")]
    MissingFields,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,
    #[error("Name must be at least 3 characters long")]
    NameTooShort,
    #[error("Title is required")]
    TitleRequired,

    // Account Errors
    #[error("User already exists")]
    UserExists,
    #[error("Email is already registered")]
    EmailTaken,
    #[error("Invalid credentials")]
    InvalidCredentials,

    // Auth Errors
    #[error("No token, authorization denied")]
    AuthFailNoToken,
    #[error("Token is not valid")]
    AuthFailInvalidToken,
    #[error("User not found")]
    AuthFailUnknownUser,
    #[error("Auth context missing")]
    AuthFailCtxNotInRequestExt,

    // Model Errors
    #[error("Todo not found")]
    TodoNotFound,
    #[error("Not authorized")]
    NotOwner,

    // Generic
    #[error("Error generating authentication token")]
    TokenSigning(#[source] TokenError),
    #[error("{context}")]
    Internal {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    /// Wrap an unexpected failure; `context` is the message the client sees.
    pub fn internal(context: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Error::Internal {
            context,
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::MissingFields
            | Error::InvalidEmail
            | Error::PasswordTooShort
            | Error::NameTooShort
            | Error::TitleRequired
            | Error::UserExists
            | Error::EmailTaken
            | Error::InvalidCredentials => StatusCode::BAD_REQUEST,
            Error::AuthFailNoToken
            | Error::AuthFailInvalidToken
            | Error::AuthFailUnknownUser
            | Error::NotOwner => StatusCode::UNAUTHORIZED,
            Error::TodoNotFound => StatusCode::NOT_FOUND,
            Error::AuthFailCtxNotInRequestExt | Error::TokenSigning(_) | Error::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Error::Internal { context, source } => {
                error!("{}: {:#}", context, source);
                json!({ "msg": context, "error": source.to_string() })
            }
            Error::TokenSigning(err) => {
                error!("Token generation error: {}", err);
                json!({ "msg": self.to_string() })
            }
            Error::AuthFailCtxNotInRequestExt => {
                error!("Handler ran without an authenticated context");
                json!({ "msg": self.to_string() })
            }
            _ => json!({ "msg": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::MissingFields.status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::InvalidCredentials.status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::EmailTaken.status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::AuthFailNoToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::NotOwner.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::AuthFailUnknownUser.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::TodoNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::internal("Server error", anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_body_carries_context_and_cause() {
        let response =
            Error::internal("Server error during login", anyhow::anyhow!("pool closed"))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["msg"], "Server error during login");
        assert_eq!(body["error"], "pool closed");
    }
}
