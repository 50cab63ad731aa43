//! Event repository / synchronization provider
//!
//! Holds the authoritative in-memory event list for the running session.
//!
//! - Loads once from the store (`Uninitialized → Loading → Ready`); a failed
//!   load leaves an empty list and a `LoadFailed` notification.
//! - Every mutation updates memory, broadcasts the new snapshot to subscribers
//!   before returning, then queues a full-collection persist.
//! - Persists run one at a time on a single background task, so the store
//!   always converges to the latest in-memory list. A failed persist is
//!   reported on the notification bus and never rolls memory back.
//! - An empty list is never persisted, so the empty pre-load state cannot wipe
//!   storage. Deleting the last record therefore leaves it in the store.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch, RwLock};
use tracing::{debug, error, info, warn};

use crate::db::EventStorage;
use crate::ids::next_id;
use crate::model::{Event, EventId, ValidatedEvent};
use crate::notify::{Notification, NotificationBus};
use crate::{Error, Result};

/// Default number of snapshots buffered per subscriber
pub const DEFAULT_SNAPSHOT_CAPACITY: usize = 64;

/// Load state of the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryState {
    Uninitialized,
    Loading,
    Ready,
}

/// Immutable view of the event list after a mutation
pub type Snapshot = Arc<Vec<Event>>;

enum PersistCommand {
    Persist(Snapshot),
    Flush(oneshot::Sender<()>),
}

/// Receives a snapshot for every change to the event list
///
/// Dropping the subscription (or calling [`Subscription::unsubscribe`]) stops
/// delivery.
///
/// Delivery is bounded: every snapshot is sent before the mutation returns,
/// but each subscriber buffers at most the repository's snapshot capacity. A
/// subscriber that falls further behind does NOT see every intermediate
/// snapshot; the oldest ones are dropped and it resumes from the oldest still
/// buffered. This is a deliberate weakening of "every subscriber sees every
/// snapshot": a snapshot is the whole list, so the latest one received is
/// always the current state.
pub struct Subscription {
    rx: broadcast::Receiver<Snapshot>,
}

impl Subscription {
    /// Wait for the next snapshot; `None` once the repository is gone
    pub async fn recv(&mut self) -> Option<Snapshot> {
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("Subscriber lagged, skipped {} snapshot(s)", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-delivered snapshot, if any
    pub fn try_recv(&mut self) -> Option<Snapshot> {
        loop {
            match self.rx.try_recv() {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

/// Single authoritative in-memory event list, synchronized to an [`EventStorage`]
pub struct EventRepository {
    events: RwLock<Vec<Event>>,
    state: watch::Sender<RepositoryState>,
    snapshots: broadcast::Sender<Snapshot>,
    store: Arc<dyn EventStorage>,
    bus: NotificationBus,
    persist_tx: mpsc::UnboundedSender<PersistCommand>,
}

impl EventRepository {
    /// Create an unloaded repository and start its persistence worker
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(store: Arc<dyn EventStorage>, bus: NotificationBus) -> Self {
        Self::with_capacity(store, bus, DEFAULT_SNAPSHOT_CAPACITY)
    }

    pub fn with_capacity(
        store: Arc<dyn EventStorage>,
        bus: NotificationBus,
        capacity: usize,
    ) -> Self {
        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_persistence(store.clone(), bus.clone(), persist_rx));

        let (snapshots, _) = broadcast::channel(capacity);
        let (state, _) = watch::channel(RepositoryState::Uninitialized);

        Self {
            events: RwLock::new(Vec::new()),
            state,
            snapshots,
            store,
            bus,
            persist_tx,
        }
    }

    pub fn state(&self) -> RepositoryState {
        *self.state.borrow()
    }

    /// Watch load-state transitions
    pub fn watch_state(&self) -> watch::Receiver<RepositoryState> {
        self.state.subscribe()
    }

    pub fn notifications(&self) -> &NotificationBus {
        &self.bus
    }

    /// Load from the store once; later calls are no-ops
    pub async fn load(&self) {
        let mut events = self.events.write().await;
        self.load_locked(&mut events).await;
    }

    async fn load_locked(&self, events: &mut Vec<Event>) {
        if self.state() != RepositoryState::Uninitialized {
            return;
        }
        self.state.send_replace(RepositoryState::Loading);

        match self.store.read_all().await {
            Ok(stored) => {
                info!("Loaded {} event(s) from local store", stored.len());
                *events = stored;
            }
            Err(e) => {
                warn!("Loading events failed, continuing with an empty list: {}", e);
                events.clear();
                self.bus.emit_lossy(Notification::LoadFailed {
                    reason: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                self.bus
                    .emit_lossy(Notification::error("Error", "Failed to load events"));
            }
        }

        self.state.send_replace(RepositoryState::Ready);
        self.broadcast(events);
    }

    /// Copy of the current list in display order
    pub async fn snapshot(&self) -> Vec<Event> {
        self.events.read().await.clone()
    }

    pub async fn get(&self, id: EventId) -> Option<Event> {
        self.events.read().await.iter().find(|e| e.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    /// Observe every subsequent change to the list
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.snapshots.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.snapshots.receiver_count()
    }

    /// Append a record whose id was already allocated
    ///
    /// Rejects id `0` and ids already present; those would break uniqueness and
    /// make every later persist fail.
    pub async fn add(&self, event: Event) -> Result<()> {
        let mut events = self.events.write().await;
        self.load_locked(&mut events).await;

        if event.id == 0 || events.iter().any(|e| e.id == event.id) {
            return Err(Error::ValidationFailed(format!(
                "event id {} is not a fresh identifier",
                event.id
            )));
        }

        debug!("Adding event {} '{}'", event.id, event.title);
        events.push(event);
        self.publish(&events);
        self.bus
            .emit_lossy(Notification::success("Success", "Event added successfully"));
        Ok(())
    }

    /// Allocate the next id and append
    ///
    /// Allocation and insertion happen under one write lock. Fails with
    /// `ValidationFailed` once the largest id in the list is `EventId::MAX`.
    pub async fn add_new(&self, validated: ValidatedEvent) -> Result<Event> {
        let mut events = self.events.write().await;
        self.load_locked(&mut events).await;

        let id = next_id(&events).ok_or_else(|| {
            Error::ValidationFailed("event identifiers are exhausted".to_string())
        })?;
        let event = validated.with_id(id);
        debug!("Adding event {} '{}'", event.id, event.title);
        events.push(event.clone());
        self.publish(&events);
        self.bus
            .emit_lossy(Notification::success("Success", "Event added successfully"));
        Ok(event)
    }

    /// Replace the record with the same id in place
    ///
    /// Returns `false` and leaves the list untouched when no such record exists.
    pub async fn update(&self, event: Event) -> bool {
        let mut events = self.events.write().await;
        self.load_locked(&mut events).await;

        let Some(slot) = events.iter_mut().find(|e| e.id == event.id) else {
            debug!("Update for unknown event {} ignored", event.id);
            return false;
        };
        *slot = event;

        self.publish(&events);
        self.bus
            .emit_lossy(Notification::success("Success", "Event updated successfully"));
        true
    }

    /// Remove the record with `id`; `false` when absent
    pub async fn delete(&self, id: EventId) -> bool {
        let mut events = self.events.write().await;
        self.load_locked(&mut events).await;

        let before = events.len();
        events.retain(|e| e.id != id);
        if events.len() == before {
            debug!("Delete for unknown event {} ignored", id);
            return false;
        }

        self.publish(&events);
        self.bus
            .emit_lossy(Notification::success("Success", "Event deleted successfully"));
        true
    }

    /// Wait until every persist queued before this call has been applied
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.persist_tx.send(PersistCommand::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    fn broadcast(&self, events: &[Event]) -> Snapshot {
        let snapshot: Snapshot = Arc::new(events.to_vec());
        // No subscribers is fine
        let _ = self.snapshots.send(snapshot.clone());
        self.bus.emit_lossy(Notification::SnapshotChanged {
            count: snapshot.len(),
            timestamp: chrono::Utc::now(),
        });
        snapshot
    }

    /// Notify subscribers, then queue persistence of the new list
    fn publish(&self, events: &[Event]) {
        let snapshot = self.broadcast(events);

        if snapshot.is_empty() {
            debug!("Event list is empty; not persisting");
            return;
        }
        if self.persist_tx.send(PersistCommand::Persist(snapshot)).is_err() {
            error!("Persistence worker has stopped; change kept in memory only");
        }
    }
}

/// Serial persistence loop
///
/// Drains whatever is queued, writes only the newest snapshot (it contains
/// every earlier change), then acknowledges pending flushes.
async fn run_persistence(
    store: Arc<dyn EventStorage>,
    bus: NotificationBus,
    mut rx: mpsc::UnboundedReceiver<PersistCommand>,
) {
    while let Some(first) = rx.recv().await {
        let mut latest = None;
        let mut waiters = Vec::new();

        let mut next = Some(first);
        while let Some(command) = next {
            match command {
                PersistCommand::Persist(snapshot) => latest = Some(snapshot),
                PersistCommand::Flush(done) => waiters.push(done),
            }
            next = rx.try_recv().ok();
        }

        if let Some(snapshot) = latest {
            match store.replace_all(&snapshot).await {
                Ok(()) => debug!("Persisted snapshot of {} event(s)", snapshot.len()),
                Err(e) => {
                    warn!("Failed to save events: {}", e);
                    bus.emit_lossy(Notification::PersistFailed {
                        reason: e.to_string(),
                        timestamp: chrono::Utc::now(),
                    });
                    bus.emit_lossy(Notification::error("Error", "Failed to save events"));
                }
            }
        }

        for done in waiters {
            let _ = done.send(());
        }
    }

    debug!("Persistence worker stopped");
}
