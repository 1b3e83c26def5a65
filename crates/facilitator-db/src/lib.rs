//! `PostgreSQL` data layer for the Arctic Echo facilitator backend.
//!
//! Implements the store ports of `facilitator-core` on top of a
//! [`PostgresPool`]. The schema lives in `migrations/` and is applied with
//! [`PostgresPool::run_migrations`].
//!
//! ```text
//! Stores
//!   |-- PgSessionStore     (sessions, single-active index)
//!   |-- PgUserStore        (users, unique email)
//!   |-- ParticipantStore   (participants)
//!   |-- EventStore         (events)
//!   |-- FeedbackStore      (feedback -> participants, cascade)
//!   +-- ScoreStore         (scores -> participants, cascade)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- Connection pool and configuration
//! - [`sessions`] -- Session persistence and atomic activation
//! - [`users`] -- Account persistence
//! - [`resources`] -- Participant, event, feedback and score repositories
//! - [`rows`] -- Row types and conversion into records
//! - [`error`] -- [`DbError`] and its mapping onto store errors

pub mod error;
pub mod postgres;
pub mod resources;
pub mod rows;
pub mod sessions;
pub mod users;

use std::sync::Arc;

use facilitator_core::Stores;

pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
pub use resources::{EventStore, FeedbackStore, ParticipantStore, ScoreStore};
pub use sessions::PgSessionStore;
pub use users::PgUserStore;

/// Every store port backed by `pool`.
pub fn stores(pool: &PostgresPool) -> Stores {
    let pg = pool.pool();
    Stores {
        sessions: Arc::new(PgSessionStore::new(pg.clone())),
        users: Arc::new(PgUserStore::new(pg.clone())),
        participants: Arc::new(ParticipantStore::new(pg.clone())),
        events: Arc::new(EventStore::new(pg.clone())),
        feedback: Arc::new(FeedbackStore::new(pg.clone())),
        scores: Arc::new(ScoreStore::new(pg.clone())),
    }
}
