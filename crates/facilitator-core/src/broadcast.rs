//! Real-time fan-out of resource changes to connected dashboards.
//!
//! The [`BroadcastHub`] wraps a single [`broadcast`] channel. Every
//! attached client holds its own receiver, so each client sees
//! notifications in the order they were issued. Delivery is
//! fire-and-forget: there is no acknowledgement, retry or replay, and a
//! client that attaches after a notification never sees it.
//!
//! If a client falls behind by more than the channel capacity it skips
//! ahead to the newest message.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default capacity of the notification channel.
pub const DEFAULT_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// Channels and messages
// ---------------------------------------------------------------------------

/// Named topic a notification is published on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    /// A participant was created.
    NewParticipant,
    /// An event was created.
    NewEvent,
    /// A score was created or updated.
    ScoreUpdated,
    /// A session started or stopped.
    SessionUpdate,
}

impl Channel {
    /// Wire name of the channel.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewParticipant => "new-participant",
            Self::NewEvent => "new-event",
            Self::ScoreUpdated => "score-updated",
            Self::SessionUpdate => "session-update",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message as pushed to every client.
///
/// Serializes to `{"channel": "<name>", "payload": <record>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Topic.
    pub channel: Channel,
    /// Full persisted record.
    pub payload: serde_json::Value,
}

/// Opaque identifier of one attached client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// A client's view of the notification stream.
pub struct Subscription {
    id: ConnectionId,
    rx: broadcast::Receiver<Arc<Notification>>,
}

impl Subscription {
    /// The connection this subscription belongs to.
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Wait for the next notification.
    ///
    /// Returns `None` once the hub is closed. Lagged messages are
    /// skipped.
    pub async fn recv(&mut self) -> Option<Arc<Notification>> {
        loop {
            match self.rx.recv().await {
                Ok(notification) => return Some(notification),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(connection = %self.id, skipped, "Client lagged, skipping ahead");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next notification if one is already queued.
    pub fn try_recv(&mut self) -> Option<Arc<Notification>> {
        loop {
            match self.rx.try_recv() {
                Ok(notification) => return Some(notification),
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(connection = %self.id, skipped, "Client lagged, skipping ahead");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Hub
// ---------------------------------------------------------------------------

/// Shared fan-out point for every dashboard connection.
///
/// One hub is created at process start and shared by handle between the
/// services (which notify) and the socket endpoint (which attaches).
pub struct BroadcastHub {
    tx: RwLock<Option<broadcast::Sender<Arc<Notification>>>>,
    connections: RwLock<HashMap<ConnectionId, DateTime<Utc>>>,
}

impl BroadcastHub {
    /// Create a hub with the default channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a hub whose channel buffers `capacity` notifications per
    /// client.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx: RwLock::new(Some(tx)),
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new client. Returns `None` once the hub is closed.
    pub async fn attach(&self) -> Option<Subscription> {
        let rx = self.tx.read().await.as_ref()?.subscribe();
        let id = ConnectionId::new();
        let total = {
            let mut connections = self.connections.write().await;
            connections.insert(id, Utc::now());
            connections.len()
        };
        info!(connection = %id, total, "Dashboard client attached");
        Some(Subscription { id, rx })
    }

    /// Forget a client. Returns `false` if it was not attached.
    pub async fn detach(&self, id: ConnectionId) -> bool {
        let (removed, total) = {
            let mut connections = self.connections.write().await;
            let removed = connections.remove(&id).is_some();
            (removed, connections.len())
        };
        if removed {
            info!(connection = %id, total, "Dashboard client detached");
        }
        removed
    }

    /// Deliver `payload` on `channel` to every attached client.
    ///
    /// Returns how many clients the message was queued for. Having no
    /// clients is not an error, and neither is a payload that fails to
    /// serialize: that is logged and counted as zero deliveries.
    pub async fn notify<T: Serialize + ?Sized>(&self, channel: Channel, payload: &T) -> usize {
        let payload = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                warn!(%channel, error = %e, "Failed to serialize notification payload");
                return 0;
            }
        };

        let guard = self.tx.read().await;
        let Some(tx) = guard.as_ref() else {
            debug!(%channel, "Hub closed, notification dropped");
            return 0;
        };

        let delivered = tx
            .send(Arc::new(Notification { channel, payload }))
            .unwrap_or(0);
        debug!(%channel, delivered, "Notification broadcast");
        delivered
    }

    /// Number of currently attached clients.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Shut the hub down. Every open subscription observes the end of the
    /// stream and later notifications reach nobody.
    pub async fn close(&self) {
        if self.tx.write().await.take().is_some() {
            let remaining = self.connections.read().await.len();
            info!(connections = remaining, "Broadcast hub closed");
        }
    }

    /// Whether [`Self::close`] has been called.
    pub async fn is_closed(&self) -> bool {
        self.tx.read().await.is_none()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BroadcastHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BroadcastHub").finish_non_exhaustive()
    }
}
