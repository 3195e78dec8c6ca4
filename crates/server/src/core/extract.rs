//! Lenient JSON body extractor.
//!
//! Request bodies here are bags of optional fields that the services
//! validate themselves. A missing body, a wrong content type or JSON that
//! does not decode into the request type all collapse to `T::default()`,
//! so the service answers with its own `400 {msg}` instead of axum's
//! plain-text 415/422 rejections.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use tracing::debug;

pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                debug!("Unusable request body, treating as empty: {}", rejection.body_text());
                Ok(JsonBody(T::default()))
            }
        }
    }
}
