//! CRUD handlers shared by every resource kind, plus health and seed.
//!
//! The CRUD handlers are generic over [`Resource`] and take the kind's
//! [`ResourceService`] as router state, so one set of functions serves
//! participants, events, feedback and scores. Reads return the kind's
//! view, which embeds the participant for feedback and scores; create and
//! update return the stored record.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use facilitator_core::{Resource, ResourceService, SeedSummary};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extract::{ValidJson, parse_id};
use crate::state::AppState;

/// Query parameters accepted by participant-scoped list routes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Only records belonging to this participant.
    pub participant_id: Option<String>,
}

/// `POST /api/<kind>`
pub async fn create<T>(
    State(service): State<ResourceService<T>>,
    ValidJson(body): ValidJson<T::Create>,
) -> Result<(StatusCode, Json<T>), ApiError>
where
    T: Resource,
    T::Create: DeserializeOwned,
{
    let record = service.create(body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/<kind>`
pub async fn list<T: Resource>(
    State(service): State<ResourceService<T>>,
) -> Result<Json<Vec<T::View>>, ApiError> {
    Ok(Json(service.list_views().await?))
}

/// `GET /api/<kind>?participantId=<id>`
pub async fn list_scoped<T: Resource>(
    State(service): State<ResourceService<T>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<T::View>>, ApiError> {
    let records = match query.participant_id.as_deref() {
        Some(raw) => service.list_views_for_participant(parse_id(raw)?).await?,
        None => service.list_views().await?,
    };
    Ok(Json(records))
}

/// `GET /api/<kind>/{id}`
pub async fn get_one<T: Resource>(
    State(service): State<ResourceService<T>>,
    Path(id): Path<String>,
) -> Result<Json<T::View>, ApiError> {
    Ok(Json(service.view(parse_id(&id)?).await?))
}

/// `PATCH /api/<kind>/{id}`
pub async fn update<T>(
    State(service): State<ResourceService<T>>,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<T::Update>,
) -> Result<Json<T>, ApiError>
where
    T: Resource,
    T::Update: DeserializeOwned,
{
    Ok(Json(service.update(parse_id(&id)?, patch).await?))
}

/// `DELETE /api/<kind>/{id}`
pub async fn remove<T: Resource>(
    State(service): State<ResourceService<T>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.remove(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/seed`
pub async fn seed(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SeedSummary>), ApiError> {
    let summary = state.services.seeder.seed().await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
    /// Open real-time connections.
    pub connections: usize,
    /// Seconds since the server started.
    pub uptime_secs: i64,
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.started_at);
    Json(HealthResponse {
        status: String::from("ok"),
        connections: state.services.hub.connection_count().await,
        uptime_secs: uptime.num_seconds(),
    })
}
