//! Row types returned by `sqlx` queries, and their conversion into
//! domain records.
//!
//! Enum columns are stored as their wire labels (`TEXT` with a `CHECK`
//! constraint) and parsed back on read.

use chrono::{DateTime, Utc};
use facilitator_types::{
    Event, EventId, Feedback, FeedbackId, Participant, ParticipantId, Score, ScoreId, Session,
    SessionId, User, UserId,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::DbError;

/// A row from the `sessions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    /// Session ID.
    pub id: Uuid,
    /// Start time.
    pub started_at: Option<DateTime<Utc>>,
    /// End time.
    pub ended_at: Option<DateTime<Utc>>,
    /// `active` or `stopped`.
    pub status: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = DbError;

    fn try_from(row: SessionRow) -> Result<Self, DbError> {
        Ok(Self {
            id: SessionId(row.id),
            started_at: row.started_at,
            ended_at: row.ended_at,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// User ID.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Bcrypt hash.
    pub password_hash: String,
    /// `facilitator` or `observer`.
    pub role: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, DbError> {
        Ok(Self {
            id: UserId(row.id),
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row from the `participants` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParticipantRow {
    /// Participant ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Simulation role.
    pub role: String,
    /// Last activity time.
    pub last_active: DateTime<Utc>,
    /// Presence label.
    pub status: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = DbError;

    fn try_from(row: ParticipantRow) -> Result<Self, DbError> {
        Ok(Self {
            id: ParticipantId(row.id),
            name: row.name,
            role: row.role,
            last_active: row.last_active,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row from the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Event ID.
    pub id: Uuid,
    /// Category label.
    pub event_type: String,
    /// Headline.
    pub title: String,
    /// Description.
    pub description: String,
    /// Trigger time.
    pub triggered_at: DateTime<Utc>,
    /// `open` or `closed`.
    pub status: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = DbError;

    fn try_from(row: EventRow) -> Result<Self, DbError> {
        Ok(Self {
            id: EventId(row.id),
            event_type: row.event_type.parse()?,
            title: row.title,
            description: row.description,
            triggered_at: row.triggered_at,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row from the `feedback` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedbackRow {
    /// Feedback ID.
    pub id: Uuid,
    /// Recipient.
    pub participant_id: Uuid,
    /// Message body.
    pub message: String,
    /// Send time.
    pub sent_at: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Self {
            id: FeedbackId(row.id),
            participant_id: ParticipantId(row.participant_id),
            message: row.message,
            sent_at: row.sent_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `scores` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoreRow {
    /// Score ID.
    pub id: Uuid,
    /// Scored participant.
    pub participant_id: Uuid,
    /// `NUMERIC(10, 2)` value.
    pub value: Decimal,
    /// Reason.
    pub reason: String,
    /// Record time.
    pub timestamp: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<ScoreRow> for Score {
    fn from(row: ScoreRow) -> Self {
        Self {
            id: ScoreId(row.id),
            participant_id: ParticipantId(row.participant_id),
            value: row.value,
            reason: row.reason,
            timestamp: row.timestamp,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
