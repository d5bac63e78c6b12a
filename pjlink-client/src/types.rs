//! Value types exchanged with a projector
//!
//! These mirror the PJLink class 1 vocabulary: power states, input
//! references, mute channels, lamp and error status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Power state as reported by `POWR ?`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerState {
    /// `0`: standby
    Off,
    /// `1`: lamp on
    On,
    /// `2`: cooling down after being switched off
    Cooling,
    /// `3`: warming up after being switched on
    WarmUp,
}

impl PowerState {
    /// All power states in protocol code order
    pub const ALL: [PowerState; 4] = [Self::Off, Self::On, Self::Cooling, Self::WarmUp];

    /// Parse a raw `POWR` response code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Self::Off),
            "1" => Some(Self::On),
            "2" => Some(Self::Cooling),
            "3" => Some(Self::WarmUp),
            _ => None,
        }
    }

    /// Raw protocol code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Off => "0",
            Self::On => "1",
            Self::Cooling => "2",
            Self::WarmUp => "3",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Cooling => "cooling",
            Self::WarmUp => "warm-up",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to one projector input: a source type name plus its number
///
/// Treated as opaque by everything above the client; the pair is only ever
/// displayed or sent back to the projector unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputSource {
    pub name: String,
    pub number: String,
}

impl InputSource {
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
        }
    }

    /// Build an input from a two-character `INPT` code such as `"31"`
    pub fn from_code(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let kind = chars.next()?;
        let number = chars.next()?;
        if chars.next().is_some() || !number.is_ascii_alphanumeric() {
            return None;
        }

        let name = match kind {
            '1' => "RGB",
            '2' => "VIDEO",
            '3' => "DIGITAL",
            '4' => "STORAGE",
            '5' => "NETWORK",
            '6' => "INTERNAL",
            _ => return None,
        };

        Some(Self::new(name, number.to_string()))
    }
}

/// Audio/video mute flags as reported by `AVMT ?`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MuteState {
    pub audio: bool,
    pub video: bool,
}

/// Channel addressed by a mute command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MuteChannel {
    Video,
    Audio,
}

impl MuteChannel {
    /// Bit used for the channel in `AVMT` commands
    pub fn code(&self) -> u8 {
        match self {
            Self::Video => 1,
            Self::Audio => 2,
        }
    }
}

/// One entry of the `LAMP ?` response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LampStatus {
    /// Cumulative lighting time in hours
    pub hours: u32,
    pub on: bool,
}

/// Severity of one subsystem in the `ERST ?` response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Ok,
    Warning,
    Error,
}

impl ErrorSeverity {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            '0' => Some(Self::Ok),
            '1' => Some(Self::Warning),
            '2' => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subsystem names of the `ERST` response, in response order
pub const ERROR_SUBSYSTEMS: [&str; 6] = ["fan", "lamp", "temperature", "cover", "filter", "other"];
