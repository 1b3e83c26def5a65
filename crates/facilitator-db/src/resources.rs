//! `PostgreSQL` repositories for participants, events, feedback and scores.
//!
//! Feedback and scores reference `participants (id)` with
//! `ON DELETE CASCADE`; inserting one for a missing participant surfaces
//! as [`StoreError::MissingReference`].

use async_trait::async_trait;
use facilitator_core::{Repository, StoreError};
use facilitator_types::{
    Event, EventId, Feedback, FeedbackId, Participant, ParticipantId, Score, ScoreId,
};
use sqlx::PgPool;

use crate::error::DbError;
use crate::rows::{EventRow, FeedbackRow, ParticipantRow, ScoreRow};

fn not_found(kind: &'static str, id: impl ToString) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

const PARTICIPANT_COLUMNS: &str = "id, name, role, last_active, status, created_at, updated_at";

/// Operations on the `participants` table.
#[derive(Clone)]
pub struct ParticipantStore {
    pool: PgPool,
}

impl ParticipantStore {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_row(&self, p: &Participant) -> Result<Participant, DbError> {
        let row = sqlx::query_as::<_, ParticipantRow>(&format!(
            "INSERT INTO participants ({PARTICIPANT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {PARTICIPANT_COLUMNS}"
        ))
        .bind(p.id.into_inner())
        .bind(&p.name)
        .bind(&p.role)
        .bind(p.last_active)
        .bind(p.status.as_str())
        .bind(p.created_at)
        .bind(p.updated_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn find_row(&self, id: ParticipantId) -> Result<Option<Participant>, DbError> {
        sqlx::query_as::<_, ParticipantRow>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?
        .map(TryInto::try_into)
        .transpose()
    }

    async fn list_rows(&self) -> Result<Vec<Participant>, DbError> {
        sqlx::query_as::<_, ParticipantRow>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
    }

    async fn update_row(&self, p: &Participant) -> Result<Option<Participant>, DbError> {
        sqlx::query_as::<_, ParticipantRow>(&format!(
            "UPDATE participants SET name = $2, role = $3, last_active = $4, status = $5, \
             updated_at = $6 WHERE id = $1 RETURNING {PARTICIPANT_COLUMNS}"
        ))
        .bind(p.id.into_inner())
        .bind(&p.name)
        .bind(&p.role)
        .bind(p.last_active)
        .bind(p.status.as_str())
        .bind(p.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .map(TryInto::try_into)
        .transpose()
    }

    async fn delete_row(&self, id: ParticipantId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Repository<Participant> for ParticipantStore {
    async fn insert(&self, record: &Participant) -> Result<Participant, StoreError> {
        Ok(self.insert_row(record).await?)
    }

    async fn find(&self, id: ParticipantId) -> Result<Option<Participant>, StoreError> {
        Ok(self.find_row(id).await?)
    }

    async fn list(&self) -> Result<Vec<Participant>, StoreError> {
        Ok(self.list_rows().await?)
    }

    async fn update(&self, record: &Participant) -> Result<Participant, StoreError> {
        self.update_row(record)
            .await?
            .ok_or_else(|| not_found("participant", record.id))
    }

    async fn delete(&self, id: ParticipantId) -> Result<bool, StoreError> {
        Ok(self.delete_row(id).await?)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

const EVENT_COLUMNS: &str =
    "id, event_type, title, description, triggered_at, status, created_at, updated_at";

/// Operations on the `events` table.
#[derive(Clone)]
pub struct EventStore {
    pool: PgPool,
}

impl EventStore {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_row(&self, e: &Event) -> Result<Event, DbError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "INSERT INTO events ({EVENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {EVENT_COLUMNS}"
        ))
        .bind(e.id.into_inner())
        .bind(e.event_type.as_str())
        .bind(&e.title)
        .bind(&e.description)
        .bind(e.triggered_at)
        .bind(e.status.as_str())
        .bind(e.created_at)
        .bind(e.updated_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn find_row(&self, id: EventId) -> Result<Option<Event>, DbError> {
        sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?
        .map(TryInto::try_into)
        .transpose()
    }

    async fn list_rows(&self) -> Result<Vec<Event>, DbError> {
        sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
    }

    async fn update_row(&self, e: &Event) -> Result<Option<Event>, DbError> {
        sqlx::query_as::<_, EventRow>(&format!(
            "UPDATE events SET event_type = $2, title = $3, description = $4, \
             triggered_at = $5, status = $6, updated_at = $7 \
             WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(e.id.into_inner())
        .bind(e.event_type.as_str())
        .bind(&e.title)
        .bind(&e.description)
        .bind(e.triggered_at)
        .bind(e.status.as_str())
        .bind(e.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .map(TryInto::try_into)
        .transpose()
    }

    async fn delete_row(&self, id: EventId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Repository<Event> for EventStore {
    async fn insert(&self, record: &Event) -> Result<Event, StoreError> {
        Ok(self.insert_row(record).await?)
    }

    async fn find(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        Ok(self.find_row(id).await?)
    }

    async fn list(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.list_rows().await?)
    }

    async fn update(&self, record: &Event) -> Result<Event, StoreError> {
        self.update_row(record)
            .await?
            .ok_or_else(|| not_found("event", record.id))
    }

    async fn delete(&self, id: EventId) -> Result<bool, StoreError> {
        Ok(self.delete_row(id).await?)
    }
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

const FEEDBACK_COLUMNS: &str = "id, participant_id, message, sent_at, created_at, updated_at";

/// Operations on the `feedback` table.
#[derive(Clone)]
pub struct FeedbackStore {
    pool: PgPool,
}

impl FeedbackStore {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_row(&self, f: &Feedback) -> Result<Feedback, DbError> {
        let row = sqlx::query_as::<_, FeedbackRow>(&format!(
            "INSERT INTO feedback ({FEEDBACK_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {FEEDBACK_COLUMNS}"
        ))
        .bind(f.id.into_inner())
        .bind(f.participant_id.into_inner())
        .bind(&f.message)
        .bind(f.sent_at)
        .bind(f.created_at)
        .bind(f.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_row(&self, id: FeedbackId) -> Result<Option<Feedback>, DbError> {
        let row = sqlx::query_as::<_, FeedbackRow>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn list_rows(&self, participant: Option<ParticipantId>) -> Result<Vec<Feedback>, DbError> {
        let rows = sqlx::query_as::<_, FeedbackRow>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback \
             WHERE $1::uuid IS NULL OR participant_id = $1 ORDER BY created_at, id"
        ))
        .bind(participant.map(ParticipantId::into_inner))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_row(&self, f: &Feedback) -> Result<Option<Feedback>, DbError> {
        let row = sqlx::query_as::<_, FeedbackRow>(&format!(
            "UPDATE feedback SET participant_id = $2, message = $3, sent_at = $4, \
             updated_at = $5 WHERE id = $1 RETURNING {FEEDBACK_COLUMNS}"
        ))
        .bind(f.id.into_inner())
        .bind(f.participant_id.into_inner())
        .bind(&f.message)
        .bind(f.sent_at)
        .bind(f.updated_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn delete_row(&self, id: FeedbackId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM feedback WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Repository<Feedback> for FeedbackStore {
    async fn insert(&self, record: &Feedback) -> Result<Feedback, StoreError> {
        Ok(self.insert_row(record).await?)
    }

    async fn find(&self, id: FeedbackId) -> Result<Option<Feedback>, StoreError> {
        Ok(self.find_row(id).await?)
    }

    async fn list(&self) -> Result<Vec<Feedback>, StoreError> {
        Ok(self.list_rows(None).await?)
    }

    async fn list_by_participant(
        &self,
        participant: ParticipantId,
    ) -> Result<Vec<Feedback>, StoreError> {
        Ok(self.list_rows(Some(participant)).await?)
    }

    async fn update(&self, record: &Feedback) -> Result<Feedback, StoreError> {
        self.update_row(record)
            .await?
            .ok_or_else(|| not_found("feedback", record.id))
    }

    async fn delete(&self, id: FeedbackId) -> Result<bool, StoreError> {
        Ok(self.delete_row(id).await?)
    }
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

const SCORE_COLUMNS: &str =
    "id, participant_id, value, reason, timestamp, created_at, updated_at";

/// Operations on the `scores` table.
#[derive(Clone)]
pub struct ScoreStore {
    pool: PgPool,
}

impl ScoreStore {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_row(&self, s: &Score) -> Result<Score, DbError> {
        let row = sqlx::query_as::<_, ScoreRow>(&format!(
            "INSERT INTO scores ({SCORE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {SCORE_COLUMNS}"
        ))
        .bind(s.id.into_inner())
        .bind(s.participant_id.into_inner())
        .bind(s.value)
        .bind(&s.reason)
        .bind(s.timestamp)
        .bind(s.created_at)
        .bind(s.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_row(&self, id: ScoreId) -> Result<Option<Score>, DbError> {
        let row = sqlx::query_as::<_, ScoreRow>(&format!(
            "SELECT {SCORE_COLUMNS} FROM scores WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn list_rows(&self, participant: Option<ParticipantId>) -> Result<Vec<Score>, DbError> {
        let rows = sqlx::query_as::<_, ScoreRow>(&format!(
            "SELECT {SCORE_COLUMNS} FROM scores \
             WHERE $1::uuid IS NULL OR participant_id = $1 ORDER BY created_at, id"
        ))
        .bind(participant.map(ParticipantId::into_inner))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_row(&self, s: &Score) -> Result<Option<Score>, DbError> {
        let row = sqlx::query_as::<_, ScoreRow>(&format!(
            "UPDATE scores SET participant_id = $2, value = $3, reason = $4, timestamp = $5, \
             updated_at = $6 WHERE id = $1 RETURNING {SCORE_COLUMNS}"
        ))
        .bind(s.id.into_inner())
        .bind(s.participant_id.into_inner())
        .bind(s.value)
        .bind(&s.reason)
        .bind(s.timestamp)
        .bind(s.updated_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn delete_row(&self, id: ScoreId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM scores WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Repository<Score> for ScoreStore {
    async fn insert(&self, record: &Score) -> Result<Score, StoreError> {
        Ok(self.insert_row(record).await?)
    }

    async fn find(&self, id: ScoreId) -> Result<Option<Score>, StoreError> {
        Ok(self.find_row(id).await?)
    }

    async fn list(&self) -> Result<Vec<Score>, StoreError> {
        Ok(self.list_rows(None).await?)
    }

    async fn list_by_participant(
        &self,
        participant: ParticipantId,
    ) -> Result<Vec<Score>, StoreError> {
        Ok(self.list_rows(Some(participant)).await?)
    }

    async fn update(&self, record: &Score) -> Result<Score, StoreError> {
        self.update_row(record)
            .await?
            .ok_or_else(|| not_found("score", record.id))
    }

    async fn delete(&self, id: ScoreId) -> Result<bool, StoreError> {
        Ok(self.delete_row(id).await?)
    }
}
