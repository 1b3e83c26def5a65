//! `PostgreSQL` session store.
//!
//! The partial unique index `sessions_single_active` allows at most one row
//! with `status = 'active'`. Activation stops the current active row and
//! inserts the next one inside a single transaction; a concurrent
//! activation that commits first makes the insert fail with a unique
//! violation, reported as [`StoreError::Conflict`] so the caller can retry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use facilitator_core::{Activation, SessionStore, StoreError};
use facilitator_types::{Session, SessionId};
use sqlx::PgPool;

use crate::error::DbError;
use crate::rows::SessionRow;

const SESSION_COLUMNS: &str = "id, started_at, ended_at, status, created_at, updated_at";

/// Operations on the `sessions` table.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn activate_rows(
        &self,
        next: &Session,
        now: DateTime<Utc>,
    ) -> Result<Activation, DbError> {
        let mut tx = self.pool.begin().await?;

        let stopped = sqlx::query_as::<_, SessionRow>(&format!(
            "UPDATE sessions SET status = 'stopped', ended_at = $1, updated_at = $1 \
             WHERE status = 'active' RETURNING {SESSION_COLUMNS}"
        ))
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let started = sqlx::query_as::<_, SessionRow>(&format!(
            "INSERT INTO sessions ({SESSION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {SESSION_COLUMNS}"
        ))
        .bind(next.id.into_inner())
        .bind(next.started_at)
        .bind(next.ended_at)
        .bind(next.status.as_str())
        .bind(next.created_at)
        .bind(next.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Activation {
            stopped: stopped.map(TryInto::try_into).transpose()?,
            started: started.try_into()?,
        })
    }

    async fn stop_rows(&self, now: DateTime<Utc>) -> Result<Option<Session>, DbError> {
        sqlx::query_as::<_, SessionRow>(&format!(
            "UPDATE sessions SET status = 'stopped', ended_at = $1, updated_at = $1 \
             WHERE status = 'active' RETURNING {SESSION_COLUMNS}"
        ))
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .map(TryInto::try_into)
        .transpose()
    }

    async fn active_row(&self) -> Result<Option<Session>, DbError> {
        sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE status = 'active'"
        ))
        .fetch_optional(&self.pool)
        .await?
        .map(TryInto::try_into)
        .transpose()
    }

    async fn find_row(&self, id: SessionId) -> Result<Option<Session>, DbError> {
        sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?
        .map(TryInto::try_into)
        .transpose()
    }

    async fn list_rows(&self) -> Result<Vec<Session>, DbError> {
        sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn activate(&self, next: &Session, now: DateTime<Utc>) -> Result<Activation, StoreError> {
        Ok(self.activate_rows(next, now).await?)
    }

    async fn stop_active(&self, now: DateTime<Utc>) -> Result<Option<Session>, StoreError> {
        Ok(self.stop_rows(now).await?)
    }

    async fn active(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.active_row().await?)
    }

    async fn find(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        Ok(self.find_row(id).await?)
    }

    async fn list(&self) -> Result<Vec<Session>, StoreError> {
        Ok(self.list_rows().await?)
    }
}
