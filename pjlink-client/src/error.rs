//! Error types for the projector client

use std::fmt;

use thiserror::Error;

/// Error codes a PJLink projector answers with instead of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectorFault {
    /// `ERR1`: the command is not supported by this projector
    UndefinedCommand,
    /// `ERR2`: the parameter is out of range
    OutOfParameter,
    /// `ERR3`: the projector is busy (e.g. warming up or cooling down)
    UnavailableTime,
    /// `ERR4`: the projector itself reported a failure
    ProjectorFailure,
}

impl ProjectorFault {
    /// Parse the `ERRn` token of a PJLink response
    pub fn from_response(token: &str) -> Option<Self> {
        match token {
            "ERR1" => Some(Self::UndefinedCommand),
            "ERR2" => Some(Self::OutOfParameter),
            "ERR3" => Some(Self::UnavailableTime),
            "ERR4" => Some(Self::ProjectorFailure),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UndefinedCommand => "undefined command",
            Self::OutOfParameter => "out of parameter",
            Self::UnavailableTime => "unavailable time",
            Self::ProjectorFailure => "projector/display failure",
        };
        f.write_str(text)
    }
}

/// Errors raised by a projector session
#[derive(Debug, Error)]
pub enum ClientError {
    /// The projector did not answer in time
    #[error("Timed out talking to projector: {0}")]
    Timeout(String),

    /// Socket-level failure (refused, unreachable, reset)
    #[error("Network error: {0}")]
    Io(#[from] std::io::Error),

    /// The projector rejected the supplied password
    #[error("Authentication failed")]
    Authentication,

    /// The projector answered with a PJLink error code
    #[error("Projector error: {0}")]
    Protocol(ProjectorFault),

    /// The projector answered with something that could not be parsed
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ClientError {
    /// Whether the failure means the projector could not be reached at all
    ///
    /// Timeouts and OS-level socket errors count as connectivity failures;
    /// everything the projector actually answered with does not.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Io(_))
    }
}

/// Type alias for results of projector operations
pub type Result<T> = std::result::Result<T, ClientError>;
