use pjlink_coordinator::CoordinatorError;
use thiserror::Error;

/// Errors from setting up or persisting a projector entry
#[derive(Error, Debug)]
pub enum SetupError {
    /// The first refresh failed; the host should retry setup later
    #[error("Projector not ready: {0}")]
    NotReady(#[source] CoordinatorError),

    #[error("Invalid entry data: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Setup task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SetupError {
    /// Whether a later retry of the same setup may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, SetupError::NotReady(_))
    }
}

pub type Result<T> = std::result::Result<T, SetupError>;
