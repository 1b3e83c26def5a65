//! Request extractors that report failures as [`ApiError`] bodies.

use std::str::FromStr;

use axum::Json;
use axum::extract::{FromRequest, Request};
use axum::extract::rejection::JsonRejection;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON body extractor whose rejection is a `400` [`ApiError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_to_error(&rejection)),
        }
    }
}

fn rejection_to_error(rejection: &JsonRejection) -> ApiError {
    ApiError::Validation(rejection.body_text())
}

/// Parse a path or query identifier.
pub fn parse_id<I: FromStr>(raw: &str) -> Result<I, ApiError> {
    match raw.parse() {
        Ok(id) => Ok(id),
        Err(_) => Err(ApiError::Validation(format!("invalid id: {raw}"))),
    }
}
