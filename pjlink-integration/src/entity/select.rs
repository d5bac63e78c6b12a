//! Input source selector

use std::sync::Arc;

use pjlink_coordinator::{Coordinator, Result};

use super::{capability_entity, CapabilityEntity, EntityContext};
use crate::constants::Platform;

/// Select entity listing the projector's inputs
///
/// The options are fixed when the entity is built: inputs added or removed
/// later only show up after the entry is reloaded. The current option is
/// read live.
#[derive(Debug, Clone)]
pub struct InputSourceSelect {
    base: CapabilityEntity,
    options: Vec<String>,
}

impl InputSourceSelect {
    pub const CAPABILITY: &'static str = "input_source";

    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        let options = coordinator
            .snapshot()
            .map(|s| s.source_list())
            .unwrap_or_default();
        let context = EntityContext::new(coordinator)
            .with_name("Input source")
            .with_icon("mdi:video-input-hdmi");
        Self {
            base: CapabilityEntity::new(context, Self::CAPABILITY),
            options,
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn current_option(&self) -> Option<String> {
        self.base.context().read(|s| s.source())
    }

    pub fn select_option(&self, option: &str) -> Result<()> {
        self.base.context().coordinator().select_source(option)?;
        self.base.request_render();
        Ok(())
    }
}

capability_entity!(InputSourceSelect, Platform::Select);
