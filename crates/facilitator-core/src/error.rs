//! Error types for the core services.
//!
//! [`StoreError`] is what a store implementation reports; [`CoreError`] is
//! what services surface to their callers. The API layer maps `CoreError`
//! onto HTTP statuses.

/// Errors reported by a store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Record kind (e.g. `participant`).
        kind: &'static str,
        /// The missing identifier.
        id: String,
    },

    /// A uniqueness rule was violated (duplicate email, second active
    /// session, duplicate id).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The record points at a row that does not exist.
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// The backend failed (connection lost, decode failure, ...).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by the core services.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An id-addressed record (or a record it references) does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Record kind (e.g. `score`).
        kind: &'static str,
        /// The missing identifier.
        id: String,
    },

    /// Input failed field rules.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Missing or bad credentials or token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A uniqueness rule was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Something failed that the caller cannot fix.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a not-found error on `kind`.
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::MissingReference(msg) => Self::NotFound {
                kind: "reference",
                id: msg,
            },
            StoreError::Backend(msg) => Self::Internal(msg),
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}
