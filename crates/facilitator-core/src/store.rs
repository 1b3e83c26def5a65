//! Store ports.
//!
//! The services never talk to a database directly; they hold
//! `Arc<dyn ...>` handles to these traits. `facilitator-db` implements them
//! on `PostgreSQL` and [`crate::memory::MemoryStore`] implements them in
//! process for tests and database-less development runs.
//!
//! ```text
//! ResourceService<T> --> Repository<T>
//! SessionManager     --> SessionStore
//! AuthService        --> UserStore
//! ```

use std::fmt::Display;
use std::hash::Hash;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use facilitator_types::{
    Event, EventId, Feedback, FeedbackId, Participant, ParticipantId, Score, ScoreId, Session,
    SessionId, User, UserId,
};
use serde::Serialize;

use crate::error::StoreError;

/// A persisted record addressed by a typed id.
pub trait Record: Clone + Serialize + Send + Sync + 'static {
    /// The record's identifier type.
    type Id: Copy + Ord + Hash + Display + FromStr + Send + Sync + 'static;

    /// Lowercase kind name used in logs and error messages.
    const KIND: &'static str;

    /// This record's identifier.
    fn id(&self) -> Self::Id;

    /// The participant this record belongs to, if the kind is
    /// participant-scoped.
    fn participant_id(&self) -> Option<ParticipantId> {
        None
    }
}

impl Record for Participant {
    type Id = ParticipantId;
    const KIND: &'static str = "participant";

    fn id(&self) -> ParticipantId {
        self.id
    }
}

impl Record for Event {
    type Id = EventId;
    const KIND: &'static str = "event";

    fn id(&self) -> EventId {
        self.id
    }
}

impl Record for Feedback {
    type Id = FeedbackId;
    const KIND: &'static str = "feedback";

    fn id(&self) -> FeedbackId {
        self.id
    }

    fn participant_id(&self) -> Option<ParticipantId> {
        Some(self.participant_id)
    }
}

impl Record for Score {
    type Id = ScoreId;
    const KIND: &'static str = "score";

    fn id(&self) -> ScoreId {
        self.id
    }

    fn participant_id(&self) -> Option<ParticipantId> {
        Some(self.participant_id)
    }
}

/// CRUD access to one record kind.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// Persist a new record and return it as stored.
    async fn insert(&self, record: &T) -> Result<T, StoreError>;

    /// Fetch one record by id.
    async fn find(&self, id: T::Id) -> Result<Option<T>, StoreError>;

    /// All records, oldest first.
    async fn list(&self) -> Result<Vec<T>, StoreError>;

    /// Records belonging to one participant, oldest first.
    async fn list_by_participant(&self, participant: ParticipantId) -> Result<Vec<T>, StoreError> {
        let all = self.list().await?;
        Ok(all
            .into_iter()
            .filter(|record| record.participant_id() == Some(participant))
            .collect())
    }

    /// Overwrite an existing record and return it as stored.
    ///
    /// Fails with [`StoreError::NotFound`] if the record vanished.
    async fn update(&self, record: &T) -> Result<T, StoreError>;

    /// Delete by id. Returns `false` if nothing was deleted.
    async fn delete(&self, id: T::Id) -> Result<bool, StoreError>;
}

/// Result of a successful session activation.
#[derive(Debug, Clone)]
pub struct Activation {
    /// The session that was active before, now stopped.
    pub stopped: Option<Session>,
    /// The newly active session.
    pub started: Session,
}

/// Persistence for sessions, including the one-active-session rule.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stop the currently active session (if any) at `now` and insert
    /// `next` as the active one, as a single atomic step.
    ///
    /// Fails with [`StoreError::Conflict`] when a concurrent activation
    /// committed first; the caller may retry.
    async fn activate(&self, next: &Session, now: DateTime<Utc>) -> Result<Activation, StoreError>;

    /// Stop the currently active session at `now`, if there is one.
    async fn stop_active(&self, now: DateTime<Utc>) -> Result<Option<Session>, StoreError>;

    /// The currently active session.
    async fn active(&self) -> Result<Option<Session>, StoreError>;

    /// Any session by id.
    async fn find(&self, id: SessionId) -> Result<Option<Session>, StoreError>;

    /// Every session, newest first.
    async fn list(&self) -> Result<Vec<Session>, StoreError>;
}

/// Persistence for dashboard accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user. Fails with [`StoreError::Conflict`] if the
    /// email is taken.
    async fn insert(&self, user: &User) -> Result<User, StoreError>;

    /// Fetch a user by id.
    async fn find(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Fetch a user by (normalized) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// One handle per store port, shared by all services.
#[derive(Clone)]
pub struct Stores {
    /// Session persistence.
    pub sessions: Arc<dyn SessionStore>,
    /// Account persistence.
    pub users: Arc<dyn UserStore>,
    /// Participant records.
    pub participants: Arc<dyn Repository<Participant>>,
    /// Event records.
    pub events: Arc<dyn Repository<Event>>,
    /// Feedback records.
    pub feedback: Arc<dyn Repository<Feedback>>,
    /// Score records.
    pub scores: Arc<dyn Repository<Score>>,
}

impl Stores {
    /// Every port backed by one shared in-process [`crate::memory::MemoryStore`].
    pub fn in_memory() -> Self {
        let store = Arc::new(crate::memory::MemoryStore::new());
        Self {
            sessions: store.clone(),
            users: store.clone(),
            participants: store.clone(),
            events: store.clone(),
            feedback: store.clone(),
            scores: store,
        }
    }
}
