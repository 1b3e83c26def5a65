//! Axum router construction.
//!
//! Assembles every route into a single [`Router`]. REST routes live under
//! `/api`; all of them except register and login sit behind the bearer
//! token layer. `/health` and `/ws` are public.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{MethodRouter, get, post};
use axum::{Router, middleware};
use facilitator_core::{Resource, ResourceService};
use facilitator_types::{Event, Feedback, Participant, Score};
use serde::de::DeserializeOwned;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;
use crate::{auth, handlers, session, ws};

/// CRUD routes for one resource kind, with `list` as the collection `GET`.
fn resource_routes<T>(
    service: ResourceService<T>,
    list: MethodRouter<ResourceService<T>>,
) -> Router<Arc<AppState>>
where
    T: Resource,
    T::Create: DeserializeOwned,
    T::Update: DeserializeOwned,
{
    Router::new()
        .route("/", list.post(handlers::create::<T>))
        .route(
            "/{id}",
            get(handlers::get_one::<T>)
                .patch(handlers::update::<T>)
                .delete(handlers::remove::<T>),
        )
        .with_state(service)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%origin, "Ignoring invalid CORS origin: {e}");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /health` -- liveness and connection count
/// - `GET /ws` -- real-time channel
/// - `POST /api/auth/register`, `POST /api/auth/login` -- public
/// - `GET /api/auth/me`
/// - `POST /api/session/start`, `POST /api/session/stop`,
///   `GET /api/session/status`, `GET /api/session`, `GET /api/session/{id}`
/// - CRUD on `/api/participants`, `/api/events`, `/api/feedback` and
///   `/api/scores` (the last two accept `?participantId=`)
/// - `POST /api/seed`
///
/// An empty `cors_origins` allows any origin.
pub fn build_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let services = &state.services;

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/session", get(session::history))
        .route("/session/start", post(session::start))
        .route("/session/stop", post(session::stop))
        .route("/session/status", get(session::status))
        .route("/session/{id}", get(session::get_one))
        .nest(
            "/participants",
            resource_routes(
                services.participants.clone(),
                get(handlers::list::<Participant>),
            ),
        )
        .nest(
            "/events",
            resource_routes(services.events.clone(), get(handlers::list::<Event>)),
        )
        .nest(
            "/feedback",
            resource_routes(
                services.feedback.clone(),
                get(handlers::list_scoped::<Feedback>),
            ),
        )
        .nest(
            "/scores",
            resource_routes(
                services.scores.clone(),
                get(handlers::list_scoped::<Score>),
            ),
        )
        .route("/seed", post(handlers::seed))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_auth,
        ));

    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/ws", get(ws::ws_handler))
        .nest("/api", protected.merge(public))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
