//! Polling coordinator for PJLink projectors
//!
//! The [`Coordinator`] owns the connection parameters of one projector and
//! the latest [`DeviceSnapshot`]. Each refresh opens a session, reads
//! identity and power (mandatory) plus input, lamps, errors and mute
//! (each optional), closes the session and publishes a new snapshot.
//! Commands open their own sessions.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pjlink_coordinator::{ConnectionParams, Coordinator, Poller};
//!
//! let params = ConnectionParams::new("192.168.1.40", 4352, "Living Room", "utf-8", None);
//! let coordinator = Arc::new(Coordinator::new(params, connector));
//!
//! // Setup does the first refresh itself and bails out if it fails
//! coordinator.refresh()?;
//!
//! // Then the poller keeps the snapshot current
//! let poller = Poller::start(Arc::clone(&coordinator));
//!
//! for event in coordinator.updates() {
//!     if event.is_published() {
//!         let snapshot = coordinator.snapshot().unwrap();
//!         println!("{}: power={}", snapshot.name, snapshot.power);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Poller (tokio interval)
//!     ↓ spawn_blocking
//! Coordinator::refresh ──► SnapshotStore<DeviceSnapshot> ──► entity adapters
//!     ↓
//! pjlink-client (Connector / Projector)
//! ```

pub mod logging;

mod coordinator;
mod error;
mod params;
mod poller;
mod session;
mod snapshot;

pub use coordinator::{Coordinator, CoordinatorStatus, SCAN_INTERVAL};
pub use error::{CoordinatorError, Result, ERR_PROJECTOR_UNAVAILABLE};
pub use params::{normalize_password, ConnectionParams};
pub use poller::Poller;
pub use snapshot::{format_input_source, has_power, DeviceSnapshot, ALIVE_POWER_STATES};

// Re-export the update event types listeners consume
pub use snapshot_store::{UpdateEvent, UpdateListener, UpdateKind};
