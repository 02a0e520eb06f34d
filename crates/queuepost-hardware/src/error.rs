//! Error types for hardware operations.
//!
//! This module defines error types specific to station hardware, covering
//! resource conflicts, invalid values, and write failures on already
//! initialized or released devices.

use crate::types::Resource;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device was used after the hardware context was released.
    #[error("Device released: {device}")]
    Released { device: String },

    /// Resource is already owned by another device.
    #[error("{resource} already claimed by {owner}")]
    ResourceInUse { resource: Resource, owner: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid value passed to a device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },
}

impl HardwareError {
    /// Create a new released error.
    pub fn released(device: impl Into<String>) -> Self {
        Self::Released {
            device: device.into(),
        }
    }

    /// Create a new resource conflict error.
    pub fn resource_in_use(resource: Resource, owner: impl Into<String>) -> Self {
        Self::ResourceInUse {
            resource,
            owner: owner.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }
}
