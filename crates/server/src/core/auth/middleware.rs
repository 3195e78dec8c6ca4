use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

/// Header carrying the raw token.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

pub async fn mw_require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    debug!("MIDDLEWARE: require_auth");

    let claims = {
        let token = extract_token(req.headers())?;
        state.tokens.verify(token).map_err(|e| {
            warn!("Rejected token: {}", e);
            Error::AuthFailInvalidToken
        })?
    };

    req.extensions_mut().insert(Ctx::for_user(claims.sub));

    Ok(next.run(req).await)
}

/// `x-auth-token: <token>` wins; `Authorization: Bearer <token>` is the fallback.
fn extract_token(headers: &HeaderMap) -> Result<&str> {
    if let Some(value) = headers.get(AUTH_TOKEN_HEADER) {
        let token = value
            .to_str()
            .map_err(|_| Error::AuthFailInvalidToken)?
            .trim();
        if token.is_empty() {
            return Err(Error::AuthFailNoToken);
        }
        return Ok(token);
    }

    match headers.get(header::AUTHORIZATION) {
        Some(value) => {
            let value = value.to_str().map_err(|_| Error::AuthFailInvalidToken)?;
            let token = value
                .strip_prefix("Bearer ")
                .ok_or(Error::AuthFailInvalidToken)?
                .trim();
            if token.is_empty() {
                return Err(Error::AuthFailNoToken);
            }
            Ok(token)
        }
        None => Err(Error::AuthFailNoToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_custom_header_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_TOKEN_HEADER, HeaderValue::from_static("abc"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_token(&headers).unwrap(), "abc");
    }

    #[test]
    fn test_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_token(&headers).unwrap(), "xyz");
    }

    #[test]
    fn test_missing_token() {
        assert!(matches!(
            extract_token(&HeaderMap::new()),
            Err(Error::AuthFailNoToken)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(AUTH_TOKEN_HEADER, HeaderValue::from_static(""));
        assert!(matches!(
            extract_token(&headers),
            Err(Error::AuthFailNoToken)
        ));
    }

    #[test]
    fn test_non_bearer_authorization_is_invalid() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert!(matches!(
            extract_token(&headers),
            Err(Error::AuthFailInvalidToken)
        ));
    }
}
