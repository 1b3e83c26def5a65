//! Shared type definitions for the Arctic Echo facilitator backend.
//!
//! This crate is the single source of truth for the records the store
//! persists, the request bodies the API accepts, and the payloads pushed to
//! dashboards over the real-time channel. Types flow downstream to
//! `TypeScript` via `ts-rs` for the dashboard client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all record identifiers
//! - [`enums`] -- Status, category and role enumerations
//! - [`structs`] -- Persisted records (sessions, participants, events, ...)
//! - [`requests`] -- Create/update/auth request bodies

pub mod enums;
pub mod ids;
pub mod requests;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    EventStatus, EventType, ParticipantStatus, SessionStatus, UnknownLabel, UserRole,
};
pub use ids::{EventId, FeedbackId, ParticipantId, ScoreId, SessionId, UserId};
pub use requests::{
    CreateEvent, CreateFeedback, CreateParticipant, CreateScore, LoginRequest, LoginResponse,
    RegisterRequest, UpdateEvent, UpdateFeedback, UpdateParticipant, UpdateScore,
};
pub use structs::{
    Event, Feedback, FeedbackView, Participant, Score, ScoreView, Session, User,
};
