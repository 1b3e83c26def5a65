//! Session lifecycle handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use facilitator_types::Session;

use crate::error::ApiError;
use crate::extract::parse_id;
use crate::state::AppState;

/// `POST /api/session/start`
pub async fn start(State(state): State<Arc<AppState>>) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.services.sessions.start().await?))
}

/// `POST /api/session/stop` -- `null` when no session was active.
pub async fn stop(State(state): State<Arc<AppState>>) -> Result<Json<Option<Session>>, ApiError> {
    Ok(Json(state.services.sessions.stop().await?))
}

/// `GET /api/session/status` -- `null` when no session is active.
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<Session>>, ApiError> {
    Ok(Json(state.services.sessions.status().await?))
}

/// `GET /api/session`
pub async fn history(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Session>>, ApiError> {
    Ok(Json(state.services.sessions.history().await?))
}

/// `GET /api/session/{id}`
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.services.sessions.get(parse_id(&id)?).await?))
}
