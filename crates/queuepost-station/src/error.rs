use queuepost_hardware::HardwareError;
use thiserror::Error;

/// Failures that end the controller loop.
///
/// Network problems never appear here; the queue service reports them as
/// missing jobs or unacknowledged notifications.
#[derive(Error, Debug)]
pub enum StationError {
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    #[error("Job cycle error: {0}")]
    Phase(#[from] queuepost_core::Error),

    #[error("Job cycle panicked: {0}")]
    Panicked(String),
}

pub type Result<T> = std::result::Result<T, StationError>;
