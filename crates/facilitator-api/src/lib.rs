//! HTTP and `WebSocket` API for the Arctic Echo facilitator backend.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **REST endpoints** under `/api` for the session lifecycle, CRUD on
//!   participants, events, feedback and scores, accounts and demo data
//! - **`WebSocket` endpoint** (`/ws`) pushing every hub notification to
//!   connected dashboards
//! - **Health endpoint** (`/health`) with the live connection count
//!
//! Every `/api` route except register and login requires a bearer token.
//! Handlers are thin: they parse input, call into `facilitator-core` and
//! map [`CoreError`](facilitator_core::CoreError) onto [`ApiError`].

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod server;
pub mod session;
pub mod state;
pub mod ws;

pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
