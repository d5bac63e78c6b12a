//! Entity adapters over the coordinator's snapshot
//!
//! Every adapter is a projection of [`Coordinator::snapshot`] plus thin
//! forwarding of user actions to the coordinator's commands. Adapters hold
//! no device state of their own; whatever they report is read from the
//! current snapshot on each call.

mod media_player;
mod select;
mod sensor;
mod switch;

pub use media_player::{MediaPlayerFeatures, MediaPlayerState, MediaType, ProjectorMediaPlayer};
pub use select::InputSourceSelect;
pub use sensor::{ErrorSensor, LampSensor, SensorEntity};
pub use switch::{MuteSwitch, PowerSwitch, SwitchEntity};

use std::sync::Arc;

use pjlink_coordinator::{Coordinator, DeviceSnapshot};
use serde::Serialize;

use crate::constants::{Platform, DOMAIN};

/// Device registry information shared by all entities of one projector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// `(domain, device_id)` pairs
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
}

/// Properties every entity exposes to the host
pub trait Entity: Send + Sync {
    fn platform(&self) -> Platform;

    fn unique_id(&self) -> String;

    /// `None` means the host should use the device name
    fn name(&self) -> Option<&str>;

    fn icon(&self) -> Option<&str>;

    fn device_info(&self) -> Option<DeviceInfo>;

    /// False while the coordinator's last refresh failed
    fn available(&self) -> bool;

    fn entity_registry_enabled_default(&self) -> bool {
        true
    }
}

/// Shared handle every adapter is built on
///
/// Holds the coordinator reference plus the static presentation data of
/// one entity. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct EntityContext {
    coordinator: Arc<Coordinator>,
    name: Option<String>,
    icon: Option<&'static str>,
    enabled_default: bool,
}

impl EntityContext {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self {
            coordinator,
            name: None,
            icon: None,
            enabled_default: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn disabled_by_default(mut self) -> Self {
        self.enabled_default = false;
        self
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    /// Current snapshot; `None` only before the first successful refresh
    pub fn snapshot(&self) -> Option<Arc<DeviceSnapshot>> {
        self.coordinator.snapshot()
    }

    /// Stable device identifier (the configured host)
    pub fn device_id(&self) -> &str {
        self.coordinator.params().host()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon
    }

    pub fn enabled_default(&self) -> bool {
        self.enabled_default
    }

    pub fn available(&self) -> bool {
        self.coordinator.last_update_success()
    }

    pub fn device_info(&self) -> Option<DeviceInfo> {
        let snapshot = self.snapshot()?;
        Some(DeviceInfo {
            identifiers: vec![(DOMAIN.to_string(), snapshot.device_id.clone())],
            name: snapshot.name.clone(),
            manufacturer: snapshot.manufacturer.clone(),
            model: snapshot.product_name.clone(),
        })
    }

    /// Read one value off the current snapshot
    pub(crate) fn read<T>(&self, f: impl FnOnce(&DeviceSnapshot) -> Option<T>) -> Option<T> {
        self.snapshot().and_then(|s| f(&s))
    }
}

/// Base for entities that expose one capability of the projector
///
/// Their unique id is `"<device_id>_<capability_id>"`.
#[derive(Debug, Clone)]
pub struct CapabilityEntity {
    context: EntityContext,
    capability_id: String,
}

impl CapabilityEntity {
    pub fn new(context: EntityContext, capability_id: impl Into<String>) -> Self {
        Self {
            context,
            capability_id: capability_id.into(),
        }
    }

    pub fn capability_id(&self) -> &str {
        &self.capability_id
    }

    pub fn context(&self) -> &EntityContext {
        &self.context
    }

    pub fn unique_id(&self) -> String {
        format!("{}_{}", self.context.device_id(), self.capability_id)
    }

    /// Ask listeners to re-render this entity without waiting for a poll
    pub(crate) fn request_render(&self) {
        self.context.coordinator().request_render(&self.unique_id());
    }
}

/// Forward the [`Entity`] plumbing of a type to its [`CapabilityEntity`]
macro_rules! capability_entity {
    ($ty:ty, $platform:expr) => {
        impl $crate::entity::Entity for $ty {
            fn platform(&self) -> $crate::constants::Platform {
                $platform
            }

            fn unique_id(&self) -> String {
                self.base.unique_id()
            }

            fn name(&self) -> Option<&str> {
                self.base.context().name()
            }

            fn icon(&self) -> Option<&str> {
                self.base.context().icon()
            }

            fn device_info(&self) -> Option<$crate::entity::DeviceInfo> {
                self.base.context().device_info()
            }

            fn available(&self) -> bool {
                self.base.context().available()
            }

            fn entity_registry_enabled_default(&self) -> bool {
                self.base.context().enabled_default()
            }
        }
    };
}

pub(crate) use capability_entity;
