//! Core services for the Arctic Echo facilitator backend.
//!
//! This crate owns the single-active-session state machine, the broadcast
//! hub that pushes changes to dashboards, and CRUD orchestration for the
//! simulation records. Persistence sits behind the ports in [`store`];
//! `facilitator-db` implements them on `PostgreSQL` and [`memory`]
//! implements them in process.
//!
//! # Modules
//!
//! - [`auth`] -- Registration, login and bearer token verification
//! - [`broadcast`] -- [`BroadcastHub`] fan-out to dashboard connections
//! - [`error`] -- [`StoreError`] and [`CoreError`]
//! - [`memory`] -- In-process store
//! - [`records`] -- Per-kind CRUD rules
//! - [`seed`] -- Demo data
//! - [`service`] -- Generic [`ResourceService`]
//! - [`services`] -- [`Services`] wiring
//! - [`session`] -- [`SessionManager`]
//! - [`store`] -- Store ports
//!
//! [`BroadcastHub`]: broadcast::BroadcastHub
//! [`StoreError`]: error::StoreError
//! [`CoreError`]: error::CoreError
//! [`ResourceService`]: service::ResourceService
//! [`Services`]: services::Services
//! [`SessionManager`]: session::SessionManager

pub mod auth;
pub mod broadcast;
pub mod error;
pub mod memory;
pub mod records;
pub mod seed;
pub mod service;
pub mod services;
pub mod session;
pub mod store;

pub use auth::{AuthConfig, AuthService, Claims};
pub use broadcast::{BroadcastHub, Channel, ConnectionId, Notification, Subscription};
pub use error::{CoreError, StoreError};
pub use seed::{SeedSummary, Seeder};
pub use service::{
    EventService, FeedbackService, ParticipantService, Resource, ResourceService, ScoreService,
};
pub use services::Services;
pub use session::SessionManager;
pub use store::{Activation, Record, Repository, SessionStore, Stores, UserStore};
