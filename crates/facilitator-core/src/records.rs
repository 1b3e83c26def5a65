//! [`Resource`] rules for each CRUD record kind.
//!
//! | Kind        | On create         | On update       |
//! |-------------|-------------------|-----------------|
//! | Participant | `new-participant` | -               |
//! | Event       | `new-event`       | -               |
//! | Feedback    | -                 | -               |
//! | Score       | `score-updated`   | `score-updated` |

use chrono::{DateTime, Utc};
use facilitator_types::requests::{SCORE_SCALE, validate_score_value};
use facilitator_types::{
    CreateEvent, CreateFeedback, CreateParticipant, CreateScore, Event, EventId, Feedback,
    FeedbackId, FeedbackView, Participant, ParticipantId, Score, ScoreId, ScoreView, UpdateEvent,
    UpdateFeedback, UpdateParticipant, UpdateScore,
};
use rust_decimal::Decimal;
use validator::Validate;

use crate::broadcast::Channel;
use crate::error::CoreError;
use crate::service::Resource;

fn score_value(value: Decimal) -> Decimal {
    value.round_dp(SCORE_SCALE)
}

impl Resource for Participant {
    type Create = CreateParticipant;
    type Update = UpdateParticipant;
    type View = Self;

    const CREATED: Option<Channel> = Some(Channel::NewParticipant);

    fn build(input: CreateParticipant, now: DateTime<Utc>) -> Self {
        Self {
            id: ParticipantId::new(),
            name: input.name,
            role: input.role,
            last_active: input.last_active.unwrap_or(now),
            status: input.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: UpdateParticipant, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(last_active) = patch.last_active {
            self.last_active = last_active;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = now;
    }

    fn into_view(self, _participant: Option<Participant>) -> Option<Self> {
        Some(self)
    }
}

impl Resource for Event {
    type Create = CreateEvent;
    type Update = UpdateEvent;
    type View = Self;

    const CREATED: Option<Channel> = Some(Channel::NewEvent);

    fn build(input: CreateEvent, now: DateTime<Utc>) -> Self {
        Self {
            id: EventId::new(),
            event_type: input.event_type,
            title: input.title,
            description: input.description,
            triggered_at: input.triggered_at.unwrap_or(now),
            status: input.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: UpdateEvent, now: DateTime<Utc>) {
        if let Some(event_type) = patch.event_type {
            self.event_type = event_type;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(triggered_at) = patch.triggered_at {
            self.triggered_at = triggered_at;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = now;
    }

    fn into_view(self, _participant: Option<Participant>) -> Option<Self> {
        Some(self)
    }
}

impl Resource for Feedback {
    type Create = CreateFeedback;
    type Update = UpdateFeedback;
    type View = FeedbackView;

    const CREATED: Option<Channel> = None;

    fn build(input: CreateFeedback, now: DateTime<Utc>) -> Self {
        Self {
            id: FeedbackId::new(),
            participant_id: input.participant_id,
            message: input.message,
            sent_at: input.sent_at.unwrap_or(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: UpdateFeedback, now: DateTime<Utc>) {
        if let Some(participant_id) = patch.participant_id {
            self.participant_id = participant_id;
        }
        if let Some(message) = patch.message {
            self.message = message;
        }
        if let Some(sent_at) = patch.sent_at {
            self.sent_at = sent_at;
        }
        self.updated_at = now;
    }

    fn into_view(self, participant: Option<Participant>) -> Option<FeedbackView> {
        participant.map(|participant| FeedbackView {
            feedback: self,
            participant,
        })
    }
}

impl Resource for Score {
    type Create = CreateScore;
    type Update = UpdateScore;
    type View = ScoreView;

    const CREATED: Option<Channel> = Some(Channel::ScoreUpdated);
    const UPDATED: Option<Channel> = Some(Channel::ScoreUpdated);

    fn build(input: CreateScore, now: DateTime<Utc>) -> Self {
        Self {
            id: ScoreId::new(),
            participant_id: input.participant_id,
            value: score_value(input.value),
            reason: input.reason,
            timestamp: input.timestamp.unwrap_or(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: UpdateScore, now: DateTime<Utc>) {
        if let Some(participant_id) = patch.participant_id {
            self.participant_id = participant_id;
        }
        if let Some(value) = patch.value {
            self.value = score_value(value);
        }
        if let Some(reason) = patch.reason {
            self.reason = reason;
        }
        if let Some(timestamp) = patch.timestamp {
            self.timestamp = timestamp;
        }
        self.updated_at = now;
    }

    fn into_view(self, participant: Option<Participant>) -> Option<ScoreView> {
        participant.map(|participant| ScoreView {
            score: self,
            participant,
        })
    }

    fn check_update(patch: &UpdateScore) -> Result<(), CoreError> {
        patch.validate()?;
        if let Some(value) = &patch.value {
            validate_score_value(value).map_err(|e| CoreError::Validation(format!("value: {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use facilitator_types::{EventStatus, EventType, ParticipantStatus};

    use super::*;

    #[test]
    fn score_value_is_rounded_to_two_places() {
        let now = Utc::now();
        let score = Score::build(
            CreateScore {
                participant_id: ParticipantId::new(),
                value: Decimal::new(87_456, 3),
                reason: String::from("Good change management"),
                timestamp: None,
            },
            now,
        );
        assert_eq!(score.value, Decimal::new(8746, 2));
        assert_eq!(score.timestamp, now);
    }

    #[test]
    fn patch_touches_only_provided_fields() {
        let created = Utc::now();
        let mut event = Event::build(
            CreateEvent {
                event_type: EventType::Incident,
                title: String::from("Production Server Outage"),
                description: String::from("Main production server is down"),
                triggered_at: None,
                status: None,
            },
            created,
        );
        assert_eq!(event.status, EventStatus::Open);

        let later = created + chrono::Duration::minutes(10);
        event.apply(
            UpdateEvent {
                status: Some(EventStatus::Closed),
                ..UpdateEvent::default()
            },
            later,
        );
        assert_eq!(event.status, EventStatus::Closed);
        assert_eq!(event.title, "Production Server Outage");
        assert_eq!(event.triggered_at, created);
        assert_eq!(event.updated_at, later);
    }

    #[test]
    fn explicit_participant_status_is_kept() {
        let participant = Participant::build(
            CreateParticipant {
                name: String::from("Charlie Brown"),
                role: String::from("Agile Lead"),
                last_active: None,
                status: Some(ParticipantStatus::Inactive),
            },
            Utc::now(),
        );
        assert_eq!(participant.status, ParticipantStatus::Inactive);
    }
}
