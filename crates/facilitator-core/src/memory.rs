//! In-process store used by tests and database-less development runs.
//!
//! All tables live behind a single [`Mutex`], so every operation, including
//! the session "stop active, insert next" step, is atomic with respect to
//! every other. Foreign-key and cascade behavior mirrors the `PostgreSQL`
//! schema: feedback and scores must reference an existing participant, and
//! deleting a participant deletes its feedback and scores.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use facilitator_types::{
    Event, EventId, Feedback, FeedbackId, Participant, ParticipantId, Score, ScoreId, Session,
    SessionId, User, UserId,
};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::store::{Activation, Record, Repository, SessionStore, UserStore};

/// Every table of the in-memory store.
#[derive(Debug, Default)]
struct Tables {
    sessions: BTreeMap<SessionId, Session>,
    users: BTreeMap<UserId, User>,
    participants: BTreeMap<ParticipantId, Participant>,
    events: BTreeMap<EventId, Event>,
    feedback: BTreeMap<FeedbackId, Feedback>,
    scores: BTreeMap<ScoreId, Score>,
}

impl Tables {
    fn active_session_id(&self) -> Option<SessionId> {
        self.sessions
            .values()
            .find(|session| session.is_active())
            .map(|session| session.id)
    }

    fn require_participant(&self, id: Option<ParticipantId>) -> Result<(), StoreError> {
        match id {
            Some(id) if !self.participants.contains_key(&id) => Err(
                StoreError::MissingReference(format!("participant {id}")),
            ),
            _ => Ok(()),
        }
    }
}

/// Maps a record kind onto its table.
trait Table: Record {
    fn rows(tables: &Tables) -> &BTreeMap<Self::Id, Self>;
    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self>;

    /// Rows that must go with this one.
    fn cascade(_tables: &mut Tables, _id: Self::Id) {}
}

impl Table for Participant {
    fn rows(tables: &Tables) -> &BTreeMap<ParticipantId, Self> {
        &tables.participants
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<ParticipantId, Self> {
        &mut tables.participants
    }

    fn cascade(tables: &mut Tables, id: ParticipantId) {
        tables.feedback.retain(|_, row| row.participant_id != id);
        tables.scores.retain(|_, row| row.participant_id != id);
    }
}

impl Table for Event {
    fn rows(tables: &Tables) -> &BTreeMap<EventId, Self> {
        &tables.events
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<EventId, Self> {
        &mut tables.events
    }
}

impl Table for Feedback {
    fn rows(tables: &Tables) -> &BTreeMap<FeedbackId, Self> {
        &tables.feedback
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<FeedbackId, Self> {
        &mut tables.feedback
    }
}

impl Table for Score {
    fn rows(tables: &Tables) -> &BTreeMap<ScoreId, Self> {
        &tables.scores
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<ScoreId, Self> {
        &mut tables.scores
    }
}

/// Mutex-guarded in-memory implementation of every store port.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<T: Table> Repository<T> for MemoryStore {
    async fn insert(&self, record: &T) -> Result<T, StoreError> {
        let mut tables = self.tables.lock().await;
        tables.require_participant(record.participant_id())?;
        let rows = T::rows_mut(&mut tables);
        if rows.contains_key(&record.id()) {
            return Err(StoreError::Conflict(format!(
                "{} {} already exists",
                T::KIND,
                record.id()
            )));
        }
        rows.insert(record.id(), record.clone());
        Ok(record.clone())
    }

    async fn find(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(T::rows(&tables).get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<T>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(T::rows(&tables).values().cloned().collect())
    }

    async fn update(&self, record: &T) -> Result<T, StoreError> {
        let mut tables = self.tables.lock().await;
        tables.require_participant(record.participant_id())?;
        let slot = T::rows_mut(&mut tables)
            .get_mut(&record.id())
            .ok_or_else(|| StoreError::NotFound {
                kind: T::KIND,
                id: record.id().to_string(),
            })?;
        *slot = record.clone();
        Ok(record.clone())
    }

    async fn delete(&self, id: T::Id) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let removed = T::rows_mut(&mut tables).remove(&id).is_some();
        if removed {
            T::cascade(&mut tables, id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn activate(&self, next: &Session, now: DateTime<Utc>) -> Result<Activation, StoreError> {
        let mut tables = self.tables.lock().await;

        let stopped = match tables.active_session_id() {
            Some(id) => tables.sessions.get_mut(&id).map(|session| {
                session.stop(now);
                session.clone()
            }),
            None => None,
        };

        tables.sessions.insert(next.id, next.clone());

        Ok(Activation {
            stopped,
            started: next.clone(),
        })
    }

    async fn stop_active(&self, now: DateTime<Utc>) -> Result<Option<Session>, StoreError> {
        let mut tables = self.tables.lock().await;
        let Some(id) = tables.active_session_id() else {
            return Ok(None);
        };
        Ok(tables.sessions.get_mut(&id).map(|session| {
            session.stop(now);
            session.clone()
        }))
    }

    async fn active(&self) -> Result<Option<Session>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .active_session_id()
            .and_then(|id| tables.sessions.get(&id).cloned()))
    }

    async fn find(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.sessions.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Session>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.sessions.values().rev().cloned().collect())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &User) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "email {} is already registered",
                user.email
            )));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|user| user.email == email).cloned())
    }
}
