//! Media player entity: the projector as a whole

use std::ops::BitOr;
use std::sync::Arc;

use pjlink_coordinator::{Coordinator, Result};

use super::{DeviceInfo, Entity, EntityContext};
use crate::constants::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaPlayerState {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Video,
}

/// Feature bitmask advertised to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaPlayerFeatures(u32);

impl MediaPlayerFeatures {
    pub const VOLUME_MUTE: Self = Self(1 << 3);
    pub const TURN_ON: Self = Self(1 << 7);
    pub const TURN_OFF: Self = Self(1 << 8);
    pub const SELECT_SOURCE: Self = Self(1 << 11);

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MediaPlayerFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// The projector as a media player
///
/// Its unique id is the device id itself. Commands forward to the
/// coordinator and then ask for an immediate re-render; the displayed
/// state only changes once a refresh reads it back from the projector.
#[derive(Debug, Clone)]
pub struct ProjectorMediaPlayer {
    context: EntityContext,
}

impl ProjectorMediaPlayer {
    pub const ICON: &'static str = "mdi:projector";

    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self {
            context: EntityContext::new(coordinator).with_icon(Self::ICON),
        }
    }

    /// `None` before the first successful refresh
    pub fn state(&self) -> Option<MediaPlayerState> {
        self.context.read(|s| {
            Some(if s.power {
                MediaPlayerState::On
            } else {
                MediaPlayerState::Off
            })
        })
    }

    /// Label of the current input
    pub fn source(&self) -> Option<String> {
        self.context.read(|s| s.source())
    }

    /// Labels of all inputs, from the live snapshot
    pub fn source_list(&self) -> Vec<String> {
        self.context.read(|s| Some(s.source_list())).unwrap_or_default()
    }

    pub fn is_volume_muted(&self) -> Option<bool> {
        self.context.read(|s| s.audio_mute)
    }

    pub fn media_content_type(&self) -> MediaType {
        MediaType::Video
    }

    pub fn supported_features(&self) -> MediaPlayerFeatures {
        MediaPlayerFeatures::SELECT_SOURCE
            | MediaPlayerFeatures::TURN_ON
            | MediaPlayerFeatures::TURN_OFF
            | MediaPlayerFeatures::VOLUME_MUTE
    }

    pub fn turn_on(&self) -> Result<()> {
        self.context.coordinator().turn_on()?;
        self.request_render();
        Ok(())
    }

    pub fn turn_off(&self) -> Result<()> {
        self.context.coordinator().turn_off()?;
        self.request_render();
        Ok(())
    }

    pub fn mute_volume(&self, muted: bool) -> Result<()> {
        self.context.coordinator().mute_volume(muted)?;
        self.request_render();
        Ok(())
    }

    pub fn select_source(&self, source: &str) -> Result<()> {
        self.context.coordinator().select_source(source)?;
        self.request_render();
        Ok(())
    }

    fn request_render(&self) {
        self.context.coordinator().request_render(&self.unique_id());
    }
}

impl Entity for ProjectorMediaPlayer {
    fn platform(&self) -> Platform {
        Platform::MediaPlayer
    }

    fn unique_id(&self) -> String {
        self.context.device_id().to_string()
    }

    fn name(&self) -> Option<&str> {
        self.context.name()
    }

    fn icon(&self) -> Option<&str> {
        self.context.icon()
    }

    fn device_info(&self) -> Option<DeviceInfo> {
        self.context.device_info()
    }

    fn available(&self) -> bool {
        self.context.available()
    }
}
