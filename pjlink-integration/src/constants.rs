//! Integration-wide constants

use std::fmt;

use serde::{Deserialize, Serialize};

pub const DOMAIN: &str = "pjlink";

pub const CONF_NAME: &str = "name";
pub const CONF_HOST: &str = "host";
pub const CONF_PORT: &str = "port";
pub const CONF_PASSWORD: &str = "password";
pub const CONF_ENCODING: &str = "encoding";

pub const DEFAULT_PORT: u16 = 4352;
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Entity platforms a projector entry sets up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    MediaPlayer,
    Select,
    Switch,
    Sensor,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::MediaPlayer => "media_player",
            Platform::Select => "select",
            Platform::Switch => "switch",
            Platform::Sensor => "sensor",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const PLATFORMS: [Platform; 4] = [
    Platform::MediaPlayer,
    Platform::Select,
    Platform::Switch,
    Platform::Sensor,
];
