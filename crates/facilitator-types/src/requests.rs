//! Request and response bodies for the REST surface.
//!
//! Create bodies carry every required field; update bodies are PATCH
//! documents where every field is optional and only provided fields are
//! applied. Field rules are declared with `validator` and checked by the
//! services before anything reaches the store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::{Validate, ValidationError};

use crate::enums::{EventStatus, EventType, ParticipantStatus, UserRole};
use crate::ids::ParticipantId;
use crate::structs::User;

/// Longest accepted name/role/title.
const MAX_LABEL_LEN: u64 = 255;

/// Minimum password length accepted at registration and login.
pub const MIN_PASSWORD_LEN: u64 = 6;

/// Decimal places kept on score values (`NUMERIC(10, 2)`).
pub const SCORE_SCALE: u32 = 2;

/// Exclusive upper bound on a score's magnitude (`NUMERIC(10, 2)`).
pub fn max_score_magnitude() -> Decimal {
    Decimal::from(100_000_000_i64)
}

/// Reject score values that do not fit the store's `NUMERIC(10, 2)` column.
///
/// The check runs on the value as it will be stored, rounded to
/// [`SCORE_SCALE`] places, so `99999999.995` is out of range.
pub fn validate_score_value(value: &Decimal) -> Result<(), ValidationError> {
    if value.round_dp(SCORE_SCALE).abs() >= max_score_magnitude() {
        let mut err = ValidationError::new("score_range");
        err.message = Some("score value must be below 100000000 in magnitude".into());
        return Err(err);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

/// Body of `POST /api/participants`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CreateParticipant {
    /// Display name.
    #[validate(length(min = 1, max = MAX_LABEL_LEN))]
    pub name: String,
    /// Role in the simulation.
    #[validate(length(min = 1, max = MAX_LABEL_LEN))]
    pub role: String,
    /// Defaults to now.
    pub last_active: Option<DateTime<Utc>>,
    /// Defaults to `active`.
    pub status: Option<ParticipantStatus>,
}

/// Body of `PATCH /api/participants/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UpdateParticipant {
    /// New display name.
    #[validate(length(min = 1, max = MAX_LABEL_LEN))]
    pub name: Option<String>,
    /// New role.
    #[validate(length(min = 1, max = MAX_LABEL_LEN))]
    pub role: Option<String>,
    /// New last-active time.
    pub last_active: Option<DateTime<Utc>>,
    /// New presence.
    pub status: Option<ParticipantStatus>,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Body of `POST /api/events`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CreateEvent {
    /// Event category.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Short headline.
    #[validate(length(min = 1, max = MAX_LABEL_LEN))]
    pub title: String,
    /// Full description.
    pub description: String,
    /// Defaults to now.
    pub triggered_at: Option<DateTime<Utc>>,
    /// Defaults to `open`.
    pub status: Option<EventStatus>,
}

/// Body of `PATCH /api/events/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UpdateEvent {
    /// New category.
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    /// New headline.
    #[validate(length(min = 1, max = MAX_LABEL_LEN))]
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New trigger time.
    pub triggered_at: Option<DateTime<Utc>>,
    /// New status.
    pub status: Option<EventStatus>,
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// Body of `POST /api/feedback`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CreateFeedback {
    /// Recipient; must exist.
    pub participant_id: ParticipantId,
    /// Message body.
    #[validate(length(min = 1))]
    pub message: String,
    /// Defaults to now.
    pub sent_at: Option<DateTime<Utc>>,
}

/// Body of `PATCH /api/feedback/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UpdateFeedback {
    /// New recipient; must exist.
    pub participant_id: Option<ParticipantId>,
    /// New body.
    #[validate(length(min = 1))]
    pub message: Option<String>,
    /// New send time.
    pub sent_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// Body of `POST /api/scores`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CreateScore {
    /// Participant being scored; must exist.
    pub participant_id: ParticipantId,
    /// Score value; stored with two decimal places.
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    #[validate(custom(function = "validate_score_value"))]
    pub value: Decimal,
    /// Why the score was given.
    pub reason: String,
    /// Defaults to now.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Body of `PATCH /api/scores/{id}`.
///
/// `value` is range-checked by the score service since `validator` rules
/// do not reach through `Option<Decimal>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UpdateScore {
    /// New participant; must exist.
    pub participant_id: Option<ParticipantId>,
    /// New value.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[ts(type = "number | null")]
    pub value: Option<Decimal>,
    /// New reason.
    pub reason: Option<String>,
    /// New timestamp.
    pub timestamp: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RegisterRequest {
    /// Login email.
    #[validate(email)]
    pub email: String,
    /// Plain-text password, hashed before storage.
    #[validate(length(min = MIN_PASSWORD_LEN))]
    pub password: String,
    /// Defaults to `observer`.
    pub role: Option<UserRole>,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LoginRequest {
    /// Login email.
    #[validate(email)]
    pub email: String,
    /// Plain-text password.
    #[validate(length(min = MIN_PASSWORD_LEN))]
    pub password: String,
}

/// Response of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LoginResponse {
    /// Signed bearer token.
    pub access_token: String,
    /// The authenticated account.
    pub user: User,
}
