//! Error types for pjlink-coordinator

use pjlink_client::ClientError;
use thiserror::Error;

/// Message shown when the projector cannot be reached
pub const ERR_PROJECTOR_UNAVAILABLE: &str = "projector unavailable";

/// Result type for coordinator operations
pub type Result<T> = std::result::Result<T, CoordinatorError>;

#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// Connecting or talking to the projector failed at the network level
    #[error("projector unavailable: {0}")]
    Unavailable(#[source] ClientError),

    /// The projector was reachable but rejected or failed an operation
    #[error("Projector error: {0}")]
    Device(#[source] ClientError),

    /// A source label that is not in the last known input list
    #[error("Unknown input source: {0}")]
    UnknownSource(String),

    /// No refresh has succeeded yet
    #[error("No projector data available yet")]
    NoSnapshot,
}

impl CoordinatorError {
    /// Whether this is a connectivity failure
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<ClientError> for CoordinatorError {
    fn from(err: ClientError) -> Self {
        if err.is_connectivity() {
            Self::Unavailable(err)
        } else {
            Self::Device(err)
        }
    }
}
