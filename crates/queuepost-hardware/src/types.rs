//! Common types shared across hardware device implementations.
//!
//! This module defines device metadata, the button channels of a station and
//! the resources a device can claim from the [`HardwareContext`](crate::HardwareContext).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic device information.
///
/// Contains metadata about a hardware device such as name, model,
/// and firmware version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "MAX7219", "MockLamp").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// The two operator buttons of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonChannel {
    /// Operator begins serving the announced ticket.
    Start,

    /// Operator finished serving the ticket.
    End,
}

impl fmt::Display for ButtonChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonChannel::Start => write!(f, "start"),
            ButtonChannel::End => write!(f, "end"),
        }
    }
}

/// A hardware resource that can be owned by exactly one device.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    /// GPIO line, BCM numbering.
    Pin(u8),

    /// Named peripheral bus (e.g., "spi0.0" for the segment display).
    Bus(String),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Pin(pin) => write!(f, "GPIO{pin}"),
            Resource::Bus(name) => write!(f, "bus {name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_builder() {
        let info = DeviceInfo::new("MAX7219", "8-digit segment").with_firmware_version("1.0.0");

        assert_eq!(info.name, "MAX7219");
        assert_eq!(info.model, "8-digit segment");
        assert_eq!(info.firmware_version, Some("1.0.0".to_string()));
    }

    #[test]
    fn test_device_info_minimal() {
        let info = DeviceInfo::new("MockLamp", "Mock");

        assert_eq!(info.name, "MockLamp");
        assert_eq!(info.firmware_version, None);
    }

    #[test]
    fn test_button_channel_display() {
        assert_eq!(ButtonChannel::Start.to_string(), "start");
        assert_eq!(ButtonChannel::End.to_string(), "end");
    }

    #[test]
    fn test_button_channel_serialization() {
        let json = serde_json::to_string(&ButtonChannel::End).unwrap();
        assert_eq!(json, "\"end\"");
        let channel: ButtonChannel = serde_json::from_str(&json).unwrap();
        assert_eq!(channel, ButtonChannel::End);
    }

    #[test]
    fn test_resource_display() {
        assert_eq!(Resource::Pin(21).to_string(), "GPIO21");
        assert_eq!(Resource::Bus("spi0.0".into()).to_string(), "bus spi0.0");
    }
}
