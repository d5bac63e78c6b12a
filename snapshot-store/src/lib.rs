//! Snapshot publication for polled devices
//!
//! A small, generic building block: one writer periodically replaces an
//! immutable snapshot, many readers look at whichever snapshot is current,
//! and interested parties consume a stream of update events.
//!
//! # Quick Start
//!
//! ```rust
//! use snapshot_store::{SnapshotStore, UpdateKind};
//!
//! #[derive(Debug)]
//! struct Status { powered: bool }
//!
//! let store = SnapshotStore::<Status>::new();
//! let updates = store.subscribe();
//!
//! store.publish(Status { powered: true });
//!
//! let event = updates.try_recv().unwrap();
//! assert_eq!(event.kind, UpdateKind::Published { generation: 1 });
//! assert!(store.current().unwrap().powered);
//! ```
//!
//! # Architecture
//!
//! ```text
//! SnapshotStore<T>
//!     │
//!     ├── slot: RwLock<{ current: Option<Arc<T>>, generation, last_update_success }>
//!     │
//!     └── subscribers: one mpsc::Sender<UpdateEvent> per listener
//!             │
//!             ├── UpdateListener
//!             └── UpdateListener
//! ```

pub mod event;
pub mod listener;
pub mod store;

pub use event::{UpdateEvent, UpdateKind};
pub use listener::UpdateListener;
pub use store::SnapshotStore;
