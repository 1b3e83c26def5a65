//! Shared application state for the API server.

use chrono::{DateTime, Utc};
use facilitator_core::Services;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    /// Every core service.
    pub services: Services,
    /// When the server came up.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create the state around `services`.
    pub fn new(services: Services) -> Self {
        Self {
            services,
            started_at: Utc::now(),
        }
    }
}
