//! Toast-style notifications
//!
//! Every repository mutation, load and persistence outcome is announced on a
//! [`NotificationBus`]. Consumers (the SSE endpoint, logs, tests) subscribe and
//! display them transiently; nothing here blocks the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Notification delivered to user-facing consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    /// An operation completed ("Event added successfully")
    Success {
        title: String,
        description: String,
        timestamp: DateTime<Utc>,
    },

    /// An operation failed locally (export, upload, validation)
    Error {
        title: String,
        description: String,
        timestamp: DateTime<Utc>,
    },

    /// The in-memory list changed; `count` is the new length
    SnapshotChanged {
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Background persistence did not complete; in-memory state is unaffected
    PersistFailed {
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Startup load failed; the session continues with an empty list
    LoadFailed {
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Notification::Success {
            title: title.into(),
            description: description.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Notification::Error {
            title: title.into(),
            description: description.into(),
            timestamp: Utc::now(),
        }
    }

    /// Variant name, used as the SSE event name
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Success { .. } => "Success",
            Notification::Error { .. } => "Error",
            Notification::SnapshotChanged { .. } => "SnapshotChanged",
            Notification::PersistFailed { .. } => "PersistFailed",
            Notification::LoadFailed { .. } => "LoadFailed",
        }
    }

    /// True for failure notifications
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Notification::Error { .. }
                | Notification::PersistFailed { .. }
                | Notification::LoadFailed { .. }
        )
    }
}

/// Broadcast channel for [`Notification`]s
///
/// Built on `tokio::sync::broadcast`: emitting never blocks, slow subscribers
/// lag and lose the oldest entries, dropped receivers unsubscribe.
#[derive(Clone)]
pub struct NotificationBus {
    tx: broadcast::Sender<Notification>,
    capacity: usize,
}

impl NotificationBus {
    /// Create a bus buffering up to `capacity` notifications per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Receive every notification emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Emit to all subscribers; `Err` when nobody is listening
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        notification: Notification,
    ) -> Result<usize, broadcast::error::SendError<Notification>> {
        self.tx.send(notification)
    }

    /// Emit, ignoring the no-subscriber case
    pub fn emit_lossy(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_new() {
        let bus = NotificationBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = NotificationBus::new(10);
        assert!(bus.emit(Notification::success("Success", "nobody hears")).is_err());
        // Lossy variant swallows the same condition
        bus.emit_lossy(Notification::success("Success", "nobody hears"));
    }

    #[test]
    fn test_multiple_subscribers() {
        let bus = NotificationBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(Notification::error("Error", "Failed to save events"))
            .expect("emit should succeed");

        assert_eq!(rx1.try_recv().unwrap().kind(), "Error");
        assert_eq!(rx2.try_recv().unwrap().kind(), "Error");
    }

    #[test]
    fn test_serialized_tag() {
        let json = serde_json::to_value(Notification::SnapshotChanged {
            count: 3,
            timestamp: Utc::now(),
        })
        .unwrap();
        assert_eq!(json["type"], "SnapshotChanged");
        assert_eq!(json["count"], 3);
    }

    #[test]
    fn test_failure_classification() {
        assert!(Notification::error("Error", "x").is_failure());
        assert!(!Notification::success("Success", "x").is_failure());
        assert!(Notification::PersistFailed {
            reason: "disk".into(),
            timestamp: Utc::now()
        }
        .is_failure());
    }
}
