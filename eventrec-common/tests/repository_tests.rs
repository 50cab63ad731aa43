//! Event repository behaviour against a controllable storage double

use async_trait::async_trait;
use eventrec_common::db::{EventStorage, SqliteEventStore};
use eventrec_common::model::EventDraft;
use eventrec_common::notify::{Notification, NotificationBus};
use eventrec_common::repository::RepositoryState;
use eventrec_common::{Error, Event, EventRepository, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// In-memory storage with switchable failures
#[derive(Default)]
struct FakeStore {
    rows: Mutex<Vec<Event>>,
    fail_read: AtomicBool,
    fail_write: AtomicBool,
    writes: AtomicUsize,
}

impl FakeStore {
    fn with_rows(rows: Vec<Event>) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(rows),
            ..Default::default()
        })
    }

    fn rows(&self) -> Vec<Event> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventStorage for FakeStore {
    async fn replace_all(&self, records: &[Event]) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(Error::WriteFailed("disk full".to_string()));
        }
        *self.rows.lock().unwrap() = records.to_vec();
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<Event>> {
        if self.fail_read.load(Ordering::SeqCst) {
            return Err(Error::ReadFailed("store is locked".to_string()));
        }
        Ok(self.rows())
    }
}

fn event(id: u64, title: &str) -> Event {
    Event::new(id, title, "2024-01-10T00:00:00.000Z", "Technical")
}

fn ids(events: &[Event]) -> Vec<u64> {
    events.iter().map(|e| e.id).collect()
}

fn repository(store: Arc<FakeStore>) -> (EventRepository, broadcast::Receiver<Notification>) {
    let bus = NotificationBus::new(64);
    let rx = bus.subscribe();
    (EventRepository::new(store, bus), rx)
}

fn drain(rx: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut seen = Vec::new();
    while let Ok(n) = rx.try_recv() {
        seen.push(n);
    }
    seen
}

fn has_success(notes: &[Notification], text: &str) -> bool {
    notes.iter().any(|n| {
        matches!(n, Notification::Success { description, .. } if description == text)
    })
}

#[tokio::test]
async fn test_load_populates_list_and_becomes_ready() {
    let store = FakeStore::with_rows(vec![event(1, "a"), event(2, "b")]);
    let (repo, _rx) = repository(store.clone());
    assert_eq!(repo.state(), RepositoryState::Uninitialized);

    let mut sub = repo.subscribe();
    repo.load().await;

    assert_eq!(repo.state(), RepositoryState::Ready);
    assert_eq!(ids(&repo.snapshot().await), vec![1, 2]);

    // Subscribers see the loaded list
    let snapshot = sub.try_recv().expect("snapshot after load");
    assert_eq!(ids(&snapshot), vec![1, 2]);

    // Loading does not write back
    repo.flush().await;
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_watch_state_reports_ready_after_load() {
    let (repo, _rx) = repository(FakeStore::with_rows(vec![event(1, "a")]));
    let mut state = repo.watch_state();
    assert_eq!(*state.borrow_and_update(), RepositoryState::Uninitialized);

    repo.load().await;

    assert!(state.has_changed().unwrap());
    assert_eq!(*state.borrow_and_update(), RepositoryState::Ready);
}

#[tokio::test]
async fn test_load_is_idempotent() {
    let store = FakeStore::with_rows(vec![event(1, "a")]);
    let (repo, _rx) = repository(store.clone());

    repo.load().await;
    store.rows.lock().unwrap().push(event(2, "b"));
    repo.load().await;

    assert_eq!(ids(&repo.snapshot().await), vec![1]);
}

#[tokio::test]
async fn test_failed_load_leaves_empty_ready_list() {
    let store = FakeStore::with_rows(vec![event(1, "a")]);
    store.fail_read.store(true, Ordering::SeqCst);
    let (repo, mut rx) = repository(store);

    repo.load().await;

    assert_eq!(repo.state(), RepositoryState::Ready);
    assert!(repo.is_empty().await);

    let notes = drain(&mut rx);
    assert!(notes.iter().any(|n| matches!(n, Notification::LoadFailed { .. })));
    assert!(notes.iter().any(|n| {
        matches!(
            n,
            Notification::Error { description, .. } if description == "Failed to load events"
        )
    }));
}

#[tokio::test]
async fn test_add_update_delete_sequence() {
    let store = FakeStore::with_rows(vec![event(1, "a")]);
    let (repo, mut rx) = repository(store.clone());
    repo.load().await;

    repo.add(event(2, "b")).await.unwrap();
    let mut changed = event(1, "a, revised");
    changed.venue = Some("Main Hall".to_string());
    assert!(repo.update(changed.clone()).await);
    assert!(repo.delete(2).await);

    let current = repo.snapshot().await;
    assert_eq!(current, vec![changed.clone()]);
    assert_eq!(repo.get(1).await, Some(changed));

    let notes = drain(&mut rx);
    assert!(has_success(&notes, "Event added successfully"));
    assert!(has_success(&notes, "Event updated successfully"));
    assert!(has_success(&notes, "Event deleted successfully"));

    repo.flush().await;
    assert_eq!(store.rows(), current);
}

#[tokio::test]
async fn test_subscriber_sees_change_before_add_returns() {
    let (repo, _rx) = repository(FakeStore::with_rows(vec![]));
    repo.load().await;

    let mut sub = repo.subscribe();
    repo.add(event(1, "a")).await.unwrap();

    // Already delivered; no await needed
    let snapshot = sub.try_recv().expect("snapshot delivered synchronously");
    assert_eq!(ids(&snapshot), vec![1]);
}

#[tokio::test]
async fn test_lagging_subscriber_skips_to_latest_list() {
    let bus = NotificationBus::new(64);
    let repo = EventRepository::with_capacity(FakeStore::with_rows(vec![]), bus, 2);
    repo.load().await;

    let mut sub = repo.subscribe();
    for id in 1..=5 {
        repo.add(event(id, "burst")).await.unwrap();
    }

    let mut received = Vec::new();
    while let Some(snapshot) = sub.try_recv() {
        received.push(ids(&snapshot));
    }

    // Only the two newest snapshots survive; the last one is the full list
    assert_eq!(received, vec![vec![1, 2, 3, 4], vec![1, 2, 3, 4, 5]]);
}

#[tokio::test]
async fn test_unsubscribed_receiver_gets_nothing() {
    let (repo, _rx) = repository(FakeStore::with_rows(vec![]));
    repo.load().await;

    let sub = repo.subscribe();
    assert_eq!(repo.subscriber_count(), 1);
    sub.unsubscribe();
    assert_eq!(repo.subscriber_count(), 0);

    repo.add(event(1, "a")).await.unwrap();
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn test_update_unknown_id_is_noop() {
    let store = FakeStore::with_rows(vec![event(1, "a")]);
    let (repo, mut rx) = repository(store.clone());
    repo.load().await;
    drain(&mut rx);

    assert!(!repo.update(event(99, "ghost")).await);
    assert!(!repo.delete(99).await);

    assert_eq!(ids(&repo.snapshot().await), vec![1]);
    assert!(drain(&mut rx).is_empty());

    repo.flush().await;
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_add_rejects_reused_or_zero_id() {
    let (repo, _rx) = repository(FakeStore::with_rows(vec![event(1, "a")]));
    repo.load().await;

    assert!(matches!(repo.add(event(1, "dup")).await, Err(Error::ValidationFailed(_))));
    assert!(matches!(repo.add(event(0, "zero")).await, Err(Error::ValidationFailed(_))));
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn test_add_new_allocates_after_max_id() {
    let (repo, _rx) = repository(FakeStore::with_rows(vec![event(1, "a"), event(7, "b")]));

    let draft = EventDraft {
        title: Some("Robotics Expo".to_string()),
        date: Some("2024-03-01".to_string()),
        category: Some("Technical".to_string()),
        ..Default::default()
    };

    // Implicit load happens first, so the stored ids count
    let created = repo.add_new(draft.validate().unwrap()).await.unwrap();
    assert_eq!(created.id, 8);
    assert_eq!(ids(&repo.snapshot().await), vec![1, 7, 8]);
}

#[tokio::test]
async fn test_add_new_fails_when_ids_exhausted() {
    let store = FakeStore::with_rows(vec![event(1, "a")]);
    let (repo, mut rx) = repository(store.clone());
    repo.load().await;
    repo.add(event(u64::MAX, "last id")).await.unwrap();
    repo.flush().await;
    drain(&mut rx);

    let draft = EventDraft {
        title: Some("Overflow Night".to_string()),
        date: Some("2024-03-01".to_string()),
        category: Some("Cultural".to_string()),
        ..Default::default()
    };
    let result = repo.add_new(draft.validate().unwrap()).await;
    assert!(matches!(result, Err(Error::ValidationFailed(_))));

    // Nothing appended, announced or written
    assert_eq!(ids(&repo.snapshot().await), vec![1, u64::MAX]);
    assert!(drain(&mut rx).is_empty());
    repo.flush().await;
    assert_eq!(ids(&store.rows()), vec![1, u64::MAX]);

    // Explicit ids below the maximum are still accepted
    repo.add(event(2, "b")).await.unwrap();
}

#[tokio::test]
async fn test_mutation_before_load_loads_implicitly() {
    let (repo, _rx) = repository(FakeStore::with_rows(vec![event(3, "stored")]));

    repo.add(event(4, "new")).await.unwrap();

    assert_eq!(repo.state(), RepositoryState::Ready);
    assert_eq!(ids(&repo.snapshot().await), vec![3, 4]);
}

#[tokio::test]
async fn test_store_converges_to_latest_list() {
    let store = FakeStore::with_rows(vec![]);
    let (repo, _rx) = repository(store.clone());
    repo.load().await;

    for id in 1..=20 {
        repo.add(event(id, "bulk")).await.unwrap();
    }
    for id in (1..=20).filter(|id| id % 2 == 0) {
        repo.delete(id).await;
    }
    repo.flush().await;

    let mut stored = store.rows();
    stored.sort_by_key(|e| e.id);
    assert_eq!(ids(&stored), (1..=20).filter(|id| id % 2 == 1).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_empty_list_is_never_persisted() {
    let store = FakeStore::with_rows(vec![event(1, "last")]);
    let (repo, _rx) = repository(store.clone());
    repo.load().await;

    assert!(repo.delete(1).await);
    repo.flush().await;

    assert!(repo.is_empty().await);
    // Deleting the final record leaves it in storage
    assert_eq!(ids(&store.rows()), vec![1]);
}

#[tokio::test]
async fn test_failed_write_keeps_memory_and_reports() {
    let store = FakeStore::with_rows(vec![event(1, "a")]);
    let (repo, mut rx) = repository(store.clone());
    repo.load().await;

    store.fail_write.store(true, Ordering::SeqCst);
    repo.add(event(2, "b")).await.unwrap();
    repo.flush().await;

    assert_eq!(ids(&repo.snapshot().await), vec![1, 2]);
    assert_eq!(ids(&store.rows()), vec![1]);

    let notes = drain(&mut rx);
    assert!(notes.iter().any(|n| matches!(n, Notification::PersistFailed { .. })));
    assert!(notes.iter().any(|n| {
        matches!(
            n,
            Notification::Error { description, .. } if description == "Failed to save events"
        )
    }));

    // Next successful write carries the whole list
    store.fail_write.store(false, Ordering::SeqCst);
    repo.add(event(3, "c")).await.unwrap();
    repo.flush().await;
    assert_eq!(ids(&store.rows()), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_survives_restart_with_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("eventrec.db");

    {
        let store = Arc::new(SqliteEventStore::open(&db_path).await.unwrap());
        let repo = EventRepository::new(store, NotificationBus::new(16));
        repo.load().await;
        repo.add(event(1, "Tech Fest")).await.unwrap();
        repo.add(event(2, "Cultural Night")).await.unwrap();
        repo.flush().await;
    }

    let store = Arc::new(SqliteEventStore::open(&db_path).await.unwrap());
    let repo = EventRepository::new(store, NotificationBus::new(16));
    repo.load().await;

    let titles: Vec<String> = repo.snapshot().await.into_iter().map(|e| e.title).collect();
    assert_eq!(titles, vec!["Tech Fest", "Cultural Night"]);
}
