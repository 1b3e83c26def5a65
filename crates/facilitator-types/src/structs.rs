//! Persisted record types.
//!
//! These are the full records the store hands back after a write, and the
//! exact payloads pushed over the real-time channel. JSON field names are
//! camelCase to match the dashboard client.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{EventStatus, EventType, ParticipantStatus, SessionStatus, UserRole};
use crate::ids::{EventId, FeedbackId, ParticipantId, ScoreId, SessionId, UserId};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A bounded time window during which the simulation is live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Session {
    /// Session identifier.
    pub id: SessionId,
    /// When the session went live.
    pub started_at: Option<DateTime<Utc>>,
    /// When the session was stopped (`None` while active).
    pub ended_at: Option<DateTime<Utc>>,
    /// Current lifecycle state.
    pub status: SessionStatus,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// A fresh session that goes live at `now`.
    pub fn started(now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            started_at: Some(now),
            ended_at: None,
            status: SessionStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this session is the live one.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Transition to `stopped`, stamping the end time.
    pub const fn stop(&mut self, now: DateTime<Utc>) {
        self.status = SessionStatus::Stopped;
        self.ended_at = Some(now);
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// A person (or AI stand-in) playing a role in the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Participant {
    /// Participant identifier.
    pub id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Role played in the simulation (e.g. "Incident Manager").
    pub role: String,
    /// Last time the participant was seen active.
    pub last_active: DateTime<Utc>,
    /// Current presence.
    pub status: ParticipantStatus,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// Something the facilitator injected into the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Event identifier.
    pub id: EventId,
    /// Event category.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Short headline.
    pub title: String,
    /// Full description shown to participants.
    pub description: String,
    /// When the event fired.
    pub triggered_at: DateTime<Utc>,
    /// Open or closed.
    pub status: EventStatus,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// A message from the facilitator to one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Feedback {
    /// Feedback identifier.
    pub id: FeedbackId,
    /// Recipient.
    pub participant_id: ParticipantId,
    /// Message body.
    pub message: String,
    /// When the feedback was sent.
    pub sent_at: DateTime<Utc>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// A numeric score awarded to one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Score {
    /// Score identifier.
    pub id: ScoreId,
    /// Participant being scored.
    pub participant_id: ParticipantId,
    /// Score value, two decimal places.
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub value: Decimal,
    /// Why the score was given.
    pub reason: String,
    /// When the score was recorded.
    pub timestamp: DateTime<Utc>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Read views
// ---------------------------------------------------------------------------

/// Feedback as returned by reads, with its recipient embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FeedbackView {
    /// The stored feedback.
    #[serde(flatten)]
    pub feedback: Feedback,
    /// Recipient of the feedback.
    pub participant: Participant,
}

/// A score as returned by reads, with the scored participant embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ScoreView {
    /// The stored score.
    #[serde(flatten)]
    pub score: Score,
    /// Participant being scored.
    pub participant: Participant,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A dashboard account.
///
/// The password hash never leaves the process: it is skipped by both
/// serde and the generated `TypeScript` binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Login email (unique).
    pub email: String,
    /// Bcrypt hash of the password.
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: String,
    /// Access role.
    pub role: UserRole,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}
