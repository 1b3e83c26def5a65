//! Session lifecycle.
//!
//! At most one session is active at any instant. [`SessionManager::start`]
//! stops the active session (if any) and activates a fresh one as a single
//! store step; [`SessionManager::stop`] ends the active session. Every
//! transition is broadcast on [`Channel::SessionUpdate`] after it has been
//! persisted.
//!
//! ```text
//!            start()
//!  stopped ----------> active
//!     ^                  |
//!     +------------------+
//!      stop() or start()
//! ```

use std::sync::Arc;

use chrono::Utc;
use facilitator_types::{Session, SessionId};
use tracing::{info, warn};

use crate::broadcast::{BroadcastHub, Channel};
use crate::error::{CoreError, StoreError};
use crate::store::SessionStore;

/// How many times `start` retries after losing a race to a concurrent
/// activation.
pub const MAX_START_ATTEMPTS: u32 = 5;

/// Owns every session transition.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    hub: Arc<BroadcastHub>,
}

impl SessionManager {
    /// Create a manager over `store` that reports to `hub`.
    pub fn new(store: Arc<dyn SessionStore>, hub: Arc<BroadcastHub>) -> Self {
        Self { store, hub }
    }

    /// Stop the active session (if any) and start a new one.
    ///
    /// When two starts race, the one that commits last wins and the other
    /// session ends up stopped.
    pub async fn start(&self) -> Result<Session, CoreError> {
        let mut attempt = 1;
        let activation = loop {
            let now = Utc::now();
            let next = Session::started(now);
            match self.store.activate(&next, now).await {
                Ok(activation) => break activation,
                Err(StoreError::Conflict(reason)) if attempt < MAX_START_ATTEMPTS => {
                    warn!(attempt, %reason, "Concurrent session start, retrying");
                    attempt = attempt.saturating_add(1);
                }
                Err(e) => return Err(e.into()),
            }
        };

        if let Some(stopped) = &activation.stopped {
            info!(session = %stopped.id, "Session superseded");
            self.hub.notify(Channel::SessionUpdate, stopped).await;
        }

        let started = activation.started;
        info!(session = %started.id, "Session started");
        self.hub.notify(Channel::SessionUpdate, &started).await;
        Ok(started)
    }

    /// Stop the active session. Returns `None`, touching nothing, when no
    /// session is active.
    pub async fn stop(&self) -> Result<Option<Session>, CoreError> {
        let Some(stopped) = self.store.stop_active(Utc::now()).await? else {
            return Ok(None);
        };
        info!(session = %stopped.id, "Session stopped");
        self.hub.notify(Channel::SessionUpdate, &stopped).await;
        Ok(Some(stopped))
    }

    /// The active session, if any.
    pub async fn status(&self) -> Result<Option<Session>, CoreError> {
        Ok(self.store.active().await?)
    }

    /// Any session by id.
    pub async fn get(&self, id: SessionId) -> Result<Session, CoreError> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| CoreError::not_found("session", id))
    }

    /// Every session, newest first.
    pub async fn history(&self) -> Result<Vec<Session>, CoreError> {
        Ok(self.store.list().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use chrono::DateTime;
    use facilitator_types::SessionStatus;
    use tokio::sync::Mutex;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::Activation;

    fn manager() -> (SessionManager, Arc<BroadcastHub>) {
        let hub = Arc::new(BroadcastHub::new());
        let manager = SessionManager::new(Arc::new(MemoryStore::new()), Arc::clone(&hub));
        (manager, hub)
    }

    async fn active_count(manager: &SessionManager) -> usize {
        manager
            .history()
            .await
            .unwrap()
            .iter()
            .filter(|s| s.is_active())
            .count()
    }

    #[tokio::test]
    async fn started_session_is_reported_by_status() {
        let (manager, _hub) = manager();
        let started = manager.start().await.unwrap();
        let status = manager.status().await.unwrap().unwrap();
        assert_eq!(status.id, started.id);
        assert_eq!(status.status, SessionStatus::Active);
        assert!(status.started_at.is_some());
    }

    #[tokio::test]
    async fn second_start_supersedes_the_first() {
        let (manager, _hub) = manager();
        let first = manager.start().await.unwrap();
        let second = manager.start().await.unwrap();
        assert_ne!(first.id, second.id);

        let status = manager.status().await.unwrap().unwrap();
        assert_eq!(status.id, second.id);

        let old = manager.get(first.id).await.unwrap();
        assert_eq!(old.status, SessionStatus::Stopped);
        assert!(old.ended_at.is_some());
        assert_eq!(active_count(&manager).await, 1);
    }

    #[tokio::test]
    async fn stop_without_active_session_is_a_no_op() {
        let (manager, hub) = manager();
        let mut sub = hub.attach().await.unwrap();

        assert!(manager.stop().await.unwrap().is_none());
        assert!(manager.history().await.unwrap().is_empty());
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn stop_ends_the_active_session() {
        let (manager, _hub) = manager();
        let started = manager.start().await.unwrap();
        let stopped = manager.stop().await.unwrap().unwrap();
        assert_eq!(stopped.id, started.id);
        assert!(stopped.ended_at.is_some());
        assert!(manager.status().await.unwrap().is_none());
        assert!(manager.stop().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn transitions_are_broadcast_in_order() {
        let (manager, hub) = manager();
        let mut sub = hub.attach().await.unwrap();

        let first = manager.start().await.unwrap();
        let second = manager.start().await.unwrap();
        manager.stop().await.unwrap();

        let mut seen = Vec::new();
        while let Some(msg) = sub.try_recv() {
            assert_eq!(msg.channel, Channel::SessionUpdate);
            let session: Session = serde_json::from_value(msg.payload.clone()).unwrap();
            seen.push((session.id, session.status));
        }
        assert_eq!(
            seen,
            vec![
                (first.id, SessionStatus::Active),
                (first.id, SessionStatus::Stopped),
                (second.id, SessionStatus::Active),
                (second.id, SessionStatus::Stopped),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_starts_leave_one_active_session() {
        let (manager, _hub) = manager();
        let starts = (0..8).map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.start().await })
        });
        let results = futures::future::join_all(starts).await;
        assert!(results.into_iter().all(|r| r.is_ok_and(|s| s.is_ok())));

        assert_eq!(active_count(&manager).await, 1);
        assert_eq!(manager.history().await.unwrap().len(), 8);
    }

    /// Store that loses the activation race a fixed number of times.
    struct Contended {
        inner: MemoryStore,
        conflicts_left: Mutex<u32>,
    }

    #[async_trait]
    impl SessionStore for Contended {
        async fn activate(
            &self,
            next: &Session,
            now: DateTime<Utc>,
        ) -> Result<Activation, StoreError> {
            let mut left = self.conflicts_left.lock().await;
            if *left > 0 {
                *left -= 1;
                return Err(StoreError::Conflict("active session exists".to_owned()));
            }
            self.inner.activate(next, now).await
        }

        async fn stop_active(&self, now: DateTime<Utc>) -> Result<Option<Session>, StoreError> {
            self.inner.stop_active(now).await
        }

        async fn active(&self) -> Result<Option<Session>, StoreError> {
            self.inner.active().await
        }

        async fn find(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
            SessionStore::find(&self.inner, id).await
        }

        async fn list(&self) -> Result<Vec<Session>, StoreError> {
            SessionStore::list(&self.inner).await
        }
    }

    #[tokio::test]
    async fn start_retries_after_losing_a_race() {
        let store = Arc::new(Contended {
            inner: MemoryStore::new(),
            conflicts_left: Mutex::new(2),
        });
        let manager = SessionManager::new(store, Arc::new(BroadcastHub::new()));
        assert!(manager.start().await.is_ok());
    }

    #[tokio::test]
    async fn start_gives_up_after_bounded_attempts() {
        let store = Arc::new(Contended {
            inner: MemoryStore::new(),
            conflicts_left: Mutex::new(MAX_START_ATTEMPTS),
        });
        let manager = SessionManager::new(store, Arc::new(BroadcastHub::new()));
        assert!(matches!(manager.start().await, Err(CoreError::Conflict(_))));
        assert!(manager.status().await.unwrap().is_none());
    }
}
