//! Bearer-token authentication.
//!
//! [`require_auth`] runs as a route layer in front of every protected
//! route. It resolves the `Authorization: Bearer <token>` header to a
//! [`User`] and stores it in the request extensions, where handlers pick
//! it up through the [`CurrentUser`] extractor.

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use facilitator_core::AuthService;
use facilitator_types::{LoginRequest, LoginResponse, RegisterRequest, User};
use tracing::debug;

use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::state::AppState;

/// The account behind the request's bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized(String::from("authentication required")))
    }
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

/// Reject requests without a valid bearer token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(&request) else {
        debug!(path = %request.uri().path(), "Request without bearer token");
        return Err(ApiError::Unauthorized(String::from("missing bearer token")));
    };

    let user = state.services.auth.authenticate(&token).await?;
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.services.auth.register(body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(state.services.auth.login(body).await?))
}

/// `GET /api/auth/me`
pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(AuthService::me(user))
}
