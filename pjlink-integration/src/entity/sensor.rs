//! Diagnostic sensors: lamps and error status

use std::collections::BTreeMap;
use std::sync::Arc;

use pjlink_coordinator::Coordinator;

use super::{capability_entity, CapabilityEntity, Entity, EntityContext};
use crate::constants::Platform;

/// A read-only value reported by the projector
pub trait SensorEntity: Entity {
    /// Current value, `None` when the projector stopped reporting it
    fn native_value(&self) -> Option<String>;

    /// Extra attributes shown next to the value
    fn extra_state_attributes(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// On/off state and burn hours of one lamp
#[derive(Debug, Clone)]
pub struct LampSensor {
    base: CapabilityEntity,
    index: u8,
}

impl LampSensor {
    pub fn new(coordinator: Arc<Coordinator>, index: u8) -> Self {
        let context = EntityContext::new(coordinator)
            .with_name(format!("Lamp {}", index))
            .with_icon("mdi:lightbulb");
        Self {
            base: CapabilityEntity::new(context, format!("lamp_{}", index)),
            index,
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn is_lit(&self) -> Option<bool> {
        self.base.context().read(|s| s.lamps.get(&self.index).copied())
    }

    pub fn hours(&self) -> Option<u32> {
        self.base.context().read(|s| s.lamp_hours.get(&self.index).copied())
    }
}

capability_entity!(LampSensor, Platform::Sensor);

impl SensorEntity for LampSensor {
    fn native_value(&self) -> Option<String> {
        self.is_lit()
            .map(|lit| if lit { "on" } else { "off" }.to_string())
    }

    fn extra_state_attributes(&self) -> BTreeMap<String, String> {
        self.hours()
            .map(|h| BTreeMap::from([("hours".to_string(), h.to_string())]))
            .unwrap_or_default()
    }
}

/// Severity reported for one subsystem (fan, lamp, filter, ...)
///
/// Disabled by default; most users only care when something goes wrong.
#[derive(Debug, Clone)]
pub struct ErrorSensor {
    base: CapabilityEntity,
    subsystem: String,
}

impl ErrorSensor {
    pub fn new(coordinator: Arc<Coordinator>, subsystem: impl Into<String>) -> Self {
        let subsystem = subsystem.into();
        let context = EntityContext::new(coordinator)
            .with_name(format!("{} status", capitalize(&subsystem)))
            .with_icon("mdi:alert-circle-outline")
            .disabled_by_default();
        Self {
            base: CapabilityEntity::new(context, format!("error_{}", subsystem)),
            subsystem,
        }
    }

    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }
}

capability_entity!(ErrorSensor, Platform::Sensor);

impl SensorEntity for ErrorSensor {
    fn native_value(&self) -> Option<String> {
        self.base
            .context()
            .read(|s| s.errors.get(&self.subsystem).map(|e| e.as_str().to_string()))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
