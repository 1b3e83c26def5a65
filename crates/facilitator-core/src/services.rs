//! Wiring of every core service over one set of stores and one hub.

use std::sync::Arc;

use crate::auth::{AuthConfig, AuthService};
use crate::broadcast::BroadcastHub;
use crate::seed::Seeder;
use crate::service::{EventService, FeedbackService, ParticipantService, ScoreService};
use crate::session::SessionManager;
use crate::store::Stores;

/// Every service the API exposes, sharing one hub.
#[derive(Clone)]
pub struct Services {
    /// Fan-out to dashboard connections.
    pub hub: Arc<BroadcastHub>,
    /// Session lifecycle.
    pub sessions: SessionManager,
    /// Participant CRUD.
    pub participants: ParticipantService,
    /// Event CRUD.
    pub events: EventService,
    /// Feedback CRUD.
    pub feedback: FeedbackService,
    /// Score CRUD.
    pub scores: ScoreService,
    /// Accounts and tokens.
    pub auth: AuthService,
    /// Demo data.
    pub seeder: Seeder,
}

impl Services {
    /// Build every service over `stores`, reporting to `hub`.
    pub fn new(stores: Stores, hub: Arc<BroadcastHub>, auth: &AuthConfig) -> Self {
        let auth = AuthService::new(Arc::clone(&stores.users), auth);
        Self {
            sessions: SessionManager::new(Arc::clone(&stores.sessions), Arc::clone(&hub)),
            participants: ParticipantService::new(
                Arc::clone(&stores.participants),
                Arc::clone(&stores.participants),
                Arc::clone(&hub),
            ),
            events: EventService::new(
                Arc::clone(&stores.events),
                Arc::clone(&stores.participants),
                Arc::clone(&hub),
            ),
            feedback: FeedbackService::new(
                Arc::clone(&stores.feedback),
                Arc::clone(&stores.participants),
                Arc::clone(&hub),
            ),
            scores: ScoreService::new(
                Arc::clone(&stores.scores),
                Arc::clone(&stores.participants),
                Arc::clone(&hub),
            ),
            seeder: Seeder::new(stores, auth.clone()),
            auth,
            hub,
        }
    }
}
