//! PJLink projector integration
//!
//! Exposes one network projector as media player, switch, select and
//! sensor entities on top of [`pjlink_coordinator`]:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pjlink_integration::{setup_entry, ConfigFlow, FlowResult, ProjectorConfig};
//!
//! // Validate and persist the user's settings
//! let mut flow = ConfigFlow::new(Arc::clone(&connector));
//! let result = flow.step_user(Some(ProjectorConfig::new("Living Room", "192.168.1.40")), &[]);
//! let entry = result.into_entry("01J9ZK").expect("validated");
//!
//! // Set the entry up and keep it current
//! let mut integration = setup_entry(&entry, connector)?;
//! integration.start_polling();
//!
//! let player = &integration.entities().media_player;
//! println!("{:?} on {:?}", player.state(), player.source());
//! player.turn_on()?;
//!
//! integration.unload().await;
//! ```
//!
//! ## Entities
//!
//! | Platform | Entity | Built when |
//! |----------|--------|------------|
//! | media_player | [`ProjectorMediaPlayer`] | always |
//! | switch | [`PowerSwitch`] | always |
//! | switch | [`MuteSwitch`] | the channel's mute state was reported at setup |
//! | select | [`InputSourceSelect`] | at least one input was reported at setup |
//! | sensor | [`LampSensor`] | per lamp reported at setup |
//! | sensor | [`ErrorSensor`] | per subsystem in the error report at setup |

pub mod constants;
pub mod entity;

mod config;
mod config_flow;
mod error;
mod setup;

pub use config::{ConfigEntry, ProjectorConfig};
pub use config_flow::{
    user_schema, ConfigFlow, FieldKind, FlowResult, FlowStep, FormField, ABORT_ALREADY_CONFIGURED,
    ABORT_NOTHING_TO_CONFIRM, BASE_ERROR_KEY, ERR_INVALID_PORT, ERR_UNKNOWN,
};
pub use entity::{
    DeviceInfo, Entity, ErrorSensor, InputSourceSelect, LampSensor, MediaPlayerFeatures,
    MediaPlayerState, MediaType, MuteSwitch, PowerSwitch, ProjectorMediaPlayer, SensorEntity,
    SwitchEntity,
};
pub use error::{Result, SetupError};
pub use setup::{setup_entry, setup_entry_with_interval, Capabilities, Entities, ProjectorIntegration};

// Re-export what hosts need from the lower layers
pub use pjlink_coordinator::{logging, CoordinatorError, CoordinatorStatus, ERR_PROJECTOR_UNAVAILABLE};
