//! Switch entities: power and the two mute channels

use std::sync::Arc;

use pjlink_client::MuteChannel;
use pjlink_coordinator::{Coordinator, Result};

use super::{capability_entity, CapabilityEntity, Entity, EntityContext};
use crate::constants::Platform;

/// A two-state entity backed by the projector
pub trait SwitchEntity: Entity {
    /// `None` when the projector does not report this state
    fn is_on(&self) -> Option<bool>;

    fn turn_on(&self) -> Result<()>;

    fn turn_off(&self) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct PowerSwitch {
    base: CapabilityEntity,
}

impl PowerSwitch {
    pub const CAPABILITY: &'static str = "power";

    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        let context = EntityContext::new(coordinator)
            .with_name("Power")
            .with_icon("mdi:power");
        Self {
            base: CapabilityEntity::new(context, Self::CAPABILITY),
        }
    }
}

capability_entity!(PowerSwitch, Platform::Switch);

impl SwitchEntity for PowerSwitch {
    fn is_on(&self) -> Option<bool> {
        self.base.context().read(|s| Some(s.power))
    }

    fn turn_on(&self) -> Result<()> {
        self.base.context().coordinator().turn_on()
    }

    fn turn_off(&self) -> Result<()> {
        self.base.context().coordinator().turn_off()
    }
}

/// Audio or video mute
///
/// Only built for channels the projector reported at setup.
#[derive(Debug, Clone)]
pub struct MuteSwitch {
    base: CapabilityEntity,
    channel: MuteChannel,
}

impl MuteSwitch {
    pub fn new(coordinator: Arc<Coordinator>, channel: MuteChannel) -> Self {
        let (capability, name, icon) = match channel {
            MuteChannel::Audio => ("audio_mute", "Audio mute", "mdi:volume-off"),
            MuteChannel::Video => ("video_mute", "Video mute", "mdi:projector-screen-off"),
        };
        let context = EntityContext::new(coordinator)
            .with_name(name)
            .with_icon(icon);
        Self {
            base: CapabilityEntity::new(context, capability),
            channel,
        }
    }

    pub fn channel(&self) -> MuteChannel {
        self.channel
    }

    fn set(&self, muted: bool) -> Result<()> {
        let coordinator = self.base.context().coordinator();
        match self.channel {
            MuteChannel::Audio => coordinator.mute_volume(muted),
            MuteChannel::Video => coordinator.mute_video(muted),
        }
    }
}

capability_entity!(MuteSwitch, Platform::Switch);

impl SwitchEntity for MuteSwitch {
    fn is_on(&self) -> Option<bool> {
        self.base.context().read(|s| match self.channel {
            MuteChannel::Audio => s.audio_mute,
            MuteChannel::Video => s.video_mute,
        })
    }

    fn turn_on(&self) -> Result<()> {
        self.set(true)
    }

    fn turn_off(&self) -> Result<()> {
        self.set(false)
    }
}
