//! Device snapshot produced by each refresh cycle

use std::collections::BTreeMap;

use pjlink_client::{ErrorSeverity, InputSource, PowerState};
use serde::Serialize;

/// Power states in which the projector counts as powered
///
/// Warming up counts because the lamp is already on its way up; cooling
/// does not, since the lamp is already off. A power-on while cooling is
/// still sent, and the projector's `ERR3` reaches the caller.
pub const ALIVE_POWER_STATES: [PowerState; 2] = [PowerState::On, PowerState::WarmUp];

/// Whether `state` is one of [`ALIVE_POWER_STATES`]
pub fn has_power(state: PowerState) -> bool {
    ALIVE_POWER_STATES.contains(&state)
}

/// Display label of an input: `"<name> <number>"`
pub fn format_input_source(input: &InputSource) -> String {
    format!("{} {}", input.name, input.number)
}

/// Everything known about the projector as of the last successful refresh
///
/// Built only by the coordinator and replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    // Identity
    /// Stable device identifier (the configured host)
    pub device_id: String,
    pub name: String,
    pub manufacturer: String,
    pub product_name: String,

    // Power
    pub power: bool,
    pub power_state: PowerState,

    // Input
    /// Currently selected input, `None` if the projector did not report it
    pub input: Option<InputSource>,
    /// All inputs, `None` if the projector did not report them
    pub inputs: Option<Vec<InputSource>>,

    /// Lamp index (1-based) to lit
    pub lamps: BTreeMap<u8, bool>,
    /// Lamp index (1-based) to cumulative hours
    pub lamp_hours: BTreeMap<u8, u32>,

    /// Subsystem name to severity
    pub errors: BTreeMap<String, ErrorSeverity>,

    pub audio_mute: Option<bool>,
    pub video_mute: Option<bool>,
}

impl DeviceSnapshot {
    /// Label of the current input
    pub fn source(&self) -> Option<String> {
        self.input.as_ref().map(format_input_source)
    }

    /// Labels of all inputs, in projector order
    ///
    /// Falls back to the current input alone when the input list was not
    /// reported, and to an empty list when neither was.
    pub fn source_list(&self) -> Vec<String> {
        match (&self.inputs, &self.input) {
            (Some(inputs), _) => inputs.iter().map(format_input_source).collect(),
            (None, Some(input)) => vec![format_input_source(input)],
            (None, None) => Vec::new(),
        }
    }

    /// Resolve a display label back to the input it was built from
    pub fn find_source(&self, label: &str) -> Option<&InputSource> {
        match &self.inputs {
            Some(inputs) => inputs.iter().find(|i| format_input_source(i) == label),
            None => self.input.as_ref().filter(|i| format_input_source(i) == label),
        }
    }

    /// Whether any subsystem reports something other than ok
    pub fn has_errors(&self) -> bool {
        self.errors.values().any(|s| *s != ErrorSeverity::Ok)
    }
}
