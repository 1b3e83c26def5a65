//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`], which wraps the underlying
//! [`sqlx`] errors. At the store-port boundary a [`DbError`] becomes a
//! [`StoreError`], with constraint violations mapped onto the matching
//! variant.

use facilitator_core::StoreError;
use facilitator_types::UnknownLabel;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored label did not decode into its enum.
    #[error("Decode error: {0}")]
    Decode(#[from] UnknownLabel),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        if let DbError::Postgres(sqlx::Error::Database(db)) = &err {
            if db.is_unique_violation() {
                return Self::Conflict(db.message().to_owned());
            }
            if db.is_foreign_key_violation() {
                return Self::MissingReference(db.message().to_owned());
            }
        }
        tracing::error!(error = %err, "Database operation failed");
        Self::Backend(err.to_string())
    }
}
