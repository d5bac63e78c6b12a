//! Snapshot storage with wholesale replacement
//!
//! A `SnapshotStore<T>` holds at most one immutable `Arc<T>`. The single
//! writer replaces it with `publish()`; any number of readers clone the
//! `Arc` with `current()`. A failed update leaves the snapshot in place and
//! only flips the success flag.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::event::UpdateKind;
use crate::listener::{Subscribers, UpdateListener};

struct Slot<T> {
    current: Option<Arc<T>>,
    generation: u64,
    last_update_success: bool,
    last_error: Option<String>,
}

/// Holder for the latest snapshot of some state
///
/// Clones share the same slot and the same set of listeners.
///
/// # Example
///
/// ```rust
/// use snapshot_store::SnapshotStore;
///
/// let store = SnapshotStore::<String>::new();
/// assert!(store.current().is_none());
///
/// store.publish("first".to_string());
/// store.fail("device unreachable");
///
/// // The failed update keeps the previous snapshot
/// assert_eq!(store.current().as_deref().map(String::as_str), Some("first"));
/// assert!(!store.last_update_success());
/// ```
pub struct SnapshotStore<T> {
    slot: Arc<RwLock<Slot<T>>>,

    subscribers: Arc<Mutex<Subscribers>>,
}

impl<T> SnapshotStore<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(RwLock::new(Slot {
                current: None,
                generation: 0,
                last_update_success: false,
                last_error: None,
            })),
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
        }
    }

    /// The latest published snapshot, if any
    pub fn current(&self) -> Option<Arc<T>> {
        self.slot.read().ok()?.current.clone()
    }

    /// Number of snapshots published so far
    pub fn generation(&self) -> u64 {
        self.slot.read().map(|s| s.generation).unwrap_or(0)
    }

    /// Whether the most recent update attempt succeeded
    ///
    /// `false` before the first publish.
    pub fn last_update_success(&self) -> bool {
        self.slot.read().map(|s| s.last_update_success).unwrap_or(false)
    }

    /// Reason of the most recent failure, cleared by the next publish
    pub fn last_error(&self) -> Option<String> {
        self.slot.read().ok()?.last_error.clone()
    }

    /// Replace the current snapshot
    ///
    /// Returns the shared handle to the new snapshot.
    pub fn publish(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        let generation = {
            let mut slot = match self.slot.write() {
                Ok(s) => s,
                Err(poisoned) => poisoned.into_inner(),
            };
            slot.current = Some(Arc::clone(&value));
            slot.generation += 1;
            slot.last_update_success = true;
            slot.last_error = None;
            slot.generation
        };

        self.emit(UpdateKind::Published { generation });
        value
    }

    /// Record a failed update without touching the current snapshot
    pub fn fail(&self, reason: impl Into<String>) {
        let reason = reason.into();
        {
            let mut slot = match self.slot.write() {
                Ok(s) => s,
                Err(poisoned) => poisoned.into_inner(),
            };
            slot.last_update_success = false;
            slot.last_error = Some(reason.clone());
        }

        self.emit(UpdateKind::Failed { reason });
    }

    /// Ask listeners to re-render `entity_id` from the current snapshot
    pub fn request_render(&self, entity_id: impl Into<String>) {
        self.emit(UpdateKind::RenderRequested {
            entity_id: entity_id.into(),
        });
    }

    /// Register a new listener
    ///
    /// The listener receives every event emitted after this call. Events
    /// emitted while nobody listens are not kept.
    pub fn subscribe(&self) -> UpdateListener {
        self.subscribers().subscribe()
    }

    /// Listeners registered and not yet pruned
    ///
    /// A dropped listener is only noticed on the next emitted event.
    pub fn listener_count(&self) -> usize {
        self.subscribers().len()
    }

    fn emit(&self, kind: UpdateKind) {
        self.subscribers().broadcast(kind);
    }

    fn subscribers(&self) -> MutexGuard<'_, Subscribers> {
        match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<T> Default for SnapshotStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SnapshotStore<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<T> std::fmt::Debug for SnapshotStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("generation", &self.generation())
            .field("last_update_success", &self.last_update_success())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
