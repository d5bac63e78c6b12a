//! Device-client contract for PJLink projectors
//!
//! This crate describes what the rest of the workspace needs from a PJLink
//! client: a [`Connector`] that opens one session to one projector, and the
//! [`Projector`] session itself with its getters and setters. Framing,
//! the authentication handshake and response parsing belong to the concrete
//! client behind these traits.
//!
//! Every operation returns a [`ClientError`] on failure, and
//! [`ClientError::is_connectivity`] tells an unreachable projector apart
//! from one that answered with an error.
//!
//! # Wire codes
//!
//! The value types carry the PJLink codes they are exchanged as, so a
//! [`Connector`] implementation does not have to repeat the tables:
//!
//! - [`PowerState::from_code`] and [`PowerState::code`] for `POWR`
//! - [`InputSource::from_code`] for `INPT` and `INST` entries such as `"31"`
//! - [`MuteChannel::code`] for the channel digit of `AVMT` commands
//! - [`ErrorSeverity::from_code`] for each digit of an `ERST` answer
//! - [`ProjectorFault::from_response`] for `ERR1` to `ERR4` answers
//!
//! Nothing above the client calls these; they exist for client authors.
//!
//! ```rust,ignore
//! use pjlink_client::{Connector, PowerState};
//!
//! fn power_on(connector: &dyn Connector) -> pjlink_client::Result<()> {
//!     let mut projector = connector.connect("192.168.1.50", 4352, "utf-8")?;
//!     projector.authenticate(None)?;
//!     if projector.get_power()? == PowerState::Off {
//!         projector.set_power(PowerState::On)?;
//!     }
//!     projector.close();
//!     Ok(())
//! }
//! ```

mod error;
mod types;

#[cfg(feature = "test-support")]
pub mod mock;

pub use error::{ClientError, ProjectorFault, Result};
pub use types::{
    ErrorSeverity, InputSource, LampStatus, MuteChannel, MuteState, PowerState, ERROR_SUBSYSTEMS,
};

use std::collections::BTreeMap;

/// An open, exclusive session with one projector
///
/// Sessions are short-lived: callers open one per refresh or command and
/// call [`Projector::close`] when done.
pub trait Projector: Send {
    /// Authenticate the session; `None` means the projector has no password
    fn authenticate(&mut self, password: Option<&str>) -> Result<()>;

    fn get_manufacturer(&mut self) -> Result<String>;

    fn get_product_name(&mut self) -> Result<String>;

    fn get_power(&mut self) -> Result<PowerState>;

    fn set_power(&mut self, state: PowerState) -> Result<()>;

    /// Currently selected input
    fn get_input(&mut self) -> Result<InputSource>;

    fn set_input(&mut self, input: &InputSource) -> Result<()>;

    /// All inputs the projector offers
    fn get_inputs(&mut self) -> Result<Vec<InputSource>>;

    /// Lamps in projector order
    fn get_lamps(&mut self) -> Result<Vec<LampStatus>>;

    /// Error status keyed by subsystem name (see [`ERROR_SUBSYSTEMS`])
    fn get_errors(&mut self) -> Result<BTreeMap<String, ErrorSeverity>>;

    fn get_mute(&mut self) -> Result<MuteState>;

    fn set_mute(&mut self, channel: MuteChannel, muted: bool) -> Result<()>;

    /// Release the network resource held by the session
    fn close(&mut self);
}

/// Opens sessions to projectors
pub trait Connector: Send + Sync {
    /// Connect to `host:port`, decoding projector text with `encoding`
    fn connect(&self, host: &str, port: u16, encoding: &str) -> Result<Box<dyn Projector>>;
}

impl<F> Connector for F
where
    F: Fn(&str, u16, &str) -> Result<Box<dyn Projector>> + Send + Sync,
{
    fn connect(&self, host: &str, port: u16, encoding: &str) -> Result<Box<dyn Projector>> {
        self(host, port, encoding)
    }
}
