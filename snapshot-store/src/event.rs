//! Update events emitted by a snapshot store
//!
//! Events carry no snapshot data. Read the new value with
//! `SnapshotStore::current()` after receiving `Published`.

use std::time::Instant;

/// What happened to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    /// A new snapshot replaced the previous one
    Published { generation: u64 },

    /// An update attempt failed; the previous snapshot is still current
    Failed { reason: String },

    /// A consumer asked for an entity to be re-rendered without new data
    RenderRequested { entity_id: String },
}

/// An event emitted by `SnapshotStore`
#[derive(Debug, Clone)]
pub struct UpdateEvent {
    pub kind: UpdateKind,

    /// When the event was emitted
    pub timestamp: Instant,
}

impl UpdateEvent {
    pub fn new(kind: UpdateKind) -> Self {
        Self {
            kind,
            timestamp: Instant::now(),
        }
    }

    /// Whether this event means fresh data is available
    pub fn is_published(&self) -> bool {
        matches!(self.kind, UpdateKind::Published { .. })
    }
}

impl PartialEq for UpdateEvent {
    fn eq(&self, other: &Self) -> bool {
        // Timestamps are not compared
        self.kind == other.kind
    }
}
