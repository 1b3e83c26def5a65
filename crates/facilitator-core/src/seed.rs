//! Demo data for a fresh dashboard.
//!
//! Records are written straight to the stores, so seeding never
//! broadcasts. The admin account is skipped when it already exists; the
//! remaining records are added on every run.

use chrono::{DateTime, Duration, Utc};
use facilitator_types::{
    Event, EventId, EventStatus, EventType, Feedback, FeedbackId, Participant, ParticipantId,
    ParticipantStatus, RegisterRequest, Score, ScoreId, UserRole,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthService;
use crate::error::CoreError;
use crate::store::Stores;

/// Email of the seeded facilitator account.
pub const ADMIN_EMAIL: &str = "admin@arctic-echo.com";

/// Password of the seeded facilitator account.
pub const ADMIN_PASSWORD: &str = "admin123";

/// What a seed run created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    /// Whether the admin account was created (false if it existed).
    pub admin_created: bool,
    /// Participants created.
    pub participants: usize,
    /// Events created.
    pub events: usize,
    /// Feedback messages created.
    pub feedback: usize,
    /// Scores created.
    pub scores: usize,
}

/// Writes the demo data set.
#[derive(Clone)]
pub struct Seeder {
    stores: Stores,
    auth: AuthService,
}

fn ago(now: DateTime<Utc>, span: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(span).unwrap_or(now)
}

fn participant(
    name: &str,
    role: &str,
    status: ParticipantStatus,
    last_active: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Participant {
    Participant {
        id: ParticipantId::new(),
        name: name.to_owned(),
        role: role.to_owned(),
        last_active,
        status,
        created_at: now,
        updated_at: now,
    }
}

impl Seeder {
    /// Create a seeder writing to `stores`.
    pub const fn new(stores: Stores, auth: AuthService) -> Self {
        Self { stores, auth }
    }

    /// Insert the demo data set.
    pub async fn seed(&self) -> Result<SeedSummary, CoreError> {
        let now = Utc::now();
        let admin_created = self.seed_admin().await?;

        let participants = [
            participant(
                "Alice Johnson",
                "Incident Manager",
                ParticipantStatus::Active,
                now,
                now,
            ),
            participant(
                "Bob Smith",
                "Change Authority",
                ParticipantStatus::Active,
                ago(now, Duration::minutes(30)),
                now,
            ),
            participant(
                "Charlie Brown",
                "Agile Lead",
                ParticipantStatus::Inactive,
                ago(now, Duration::hours(2)),
                now,
            ),
        ];
        for record in &participants {
            self.stores.participants.insert(record).await?;
        }
        let [alice, bob, _] = &participants;

        let events = [
            Event {
                id: EventId::new(),
                event_type: EventType::Incident,
                title: String::from("Production Server Outage"),
                description: String::from(
                    "Main production server is experiencing downtime affecting all users",
                ),
                triggered_at: now,
                status: EventStatus::Open,
                created_at: now,
                updated_at: now,
            },
            Event {
                id: EventId::new(),
                event_type: EventType::Change,
                title: String::from("Database Migration Scheduled"),
                description: String::from(
                    "Scheduled maintenance window for database schema updates",
                ),
                triggered_at: ago(now, Duration::hours(1)),
                status: EventStatus::Closed,
                created_at: now,
                updated_at: now,
            },
        ];
        for record in &events {
            self.stores.events.insert(record).await?;
        }

        let feedback = Feedback {
            id: FeedbackId::new(),
            participant_id: alice.id,
            message: String::from(
                "Excellent response time on the incident! Keep up the great work.",
            ),
            sent_at: now,
            created_at: now,
            updated_at: now,
        };
        self.stores.feedback.insert(&feedback).await?;

        let scores = [
            Score {
                id: ScoreId::new(),
                participant_id: alice.id,
                value: Decimal::new(9550, 2),
                reason: String::from("Outstanding incident response and communication"),
                timestamp: now,
                created_at: now,
                updated_at: now,
            },
            Score {
                id: ScoreId::new(),
                participant_id: bob.id,
                value: Decimal::new(8700, 2),
                reason: String::from("Good change management process execution"),
                timestamp: ago(now, Duration::minutes(30)),
                created_at: now,
                updated_at: now,
            },
        ];
        for record in &scores {
            self.stores.scores.insert(record).await?;
        }

        let summary = SeedSummary {
            admin_created,
            participants: participants.len(),
            events: events.len(),
            feedback: 1,
            scores: scores.len(),
        };
        info!(
            admin_created,
            participants = summary.participants,
            events = summary.events,
            feedback = summary.feedback,
            scores = summary.scores,
            "Demo data seeded"
        );
        Ok(summary)
    }

    async fn seed_admin(&self) -> Result<bool, CoreError> {
        let request = RegisterRequest {
            email: ADMIN_EMAIL.to_owned(),
            password: ADMIN_PASSWORD.to_owned(),
            role: Some(UserRole::Facilitator),
        };
        match self.auth.register(request).await {
            Ok(_) => Ok(true),
            Err(CoreError::Conflict(_)) => {
                info!(email = ADMIN_EMAIL, "Admin account exists, skipping");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
