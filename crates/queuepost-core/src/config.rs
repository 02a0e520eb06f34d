//! Station configuration.
//!
//! Every option has a default matching the reference wiring, so an empty
//! file is a valid configuration. Values are layered by the binary:
//! built-in defaults, then an optional TOML file, then command-line flags.
//!
//! ```
//! use queuepost_core::StationConfig;
//!
//! let config = StationConfig::from_toml_str(
//!     r#"
//!     device_id = "7"
//!     server_url = "http://queue.local/api"
//!     lamp_pin = 19
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.device_id.as_str(), "7");
//! assert_eq!(config.lamp_pin, 19);
//! assert_eq!(config.start_button_pin, 21);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::{DeviceToken, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StationConfig {
    /// Identifier sent as `device_id` with every request.
    pub device_id: DeviceToken,

    /// Queue server endpoint all requests are posted to.
    pub server_url: String,

    /// Upper bound for one request, in milliseconds.
    pub request_timeout_ms: u64,

    /// Send a receipt acknowledgement after each successful poll.
    pub ack_receipt: bool,

    pub start_button_pin: u8,
    pub end_button_pin: u8,
    pub lamp_pin: u8,

    /// Bounce suppression window for both buttons, in milliseconds.
    pub bounce_window_ms: u64,

    /// Sleep between button checks, in milliseconds.
    pub poll_interval_ms: u64,

    /// Delay before re-polling after an empty or failed poll, in milliseconds.
    pub poll_retry_ms: u64,

    /// Segment display intensity (0-15).
    pub display_brightness: u8,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            device_id: DeviceToken::default(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            ack_receipt: true,
            start_button_pin: DEFAULT_START_BUTTON_PIN,
            end_button_pin: DEFAULT_END_BUTTON_PIN,
            lamp_pin: DEFAULT_LAMP_PIN,
            bounce_window_ms: DEFAULT_BOUNCE_WINDOW_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_retry_ms: DEFAULT_POLL_RETRY_MS,
            display_brightness: DEFAULT_DISPLAY_BRIGHTNESS,
        }
    }
}

impl StationConfig {
    /// Parse a configuration from TOML text and validate it.
    ///
    /// # Errors
    /// Returns `Error::ConfigParse` for malformed TOML or unknown keys and
    /// `Error::Config` if validation fails.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: StationConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML configuration file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, otherwise the same
    /// errors as [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check option values for consistency.
    ///
    /// # Errors
    /// Returns `Error::Config` when:
    /// - two roles share a pin
    /// - an interval or timeout is zero
    /// - brightness exceeds the driver maximum
    /// - the server URL is not an http(s) URL
    pub fn validate(&self) -> Result<()> {
        let pins = [
            ("start_button_pin", self.start_button_pin),
            ("end_button_pin", self.end_button_pin),
            ("lamp_pin", self.lamp_pin),
        ];
        for (i, (name, pin)) in pins.iter().enumerate() {
            if let Some((other, _)) = pins[i + 1..].iter().find(|(_, p)| p == pin) {
                return Err(Error::Config(format!(
                    "{name} and {other} both use pin {pin}"
                )));
            }
        }

        let intervals = [
            ("request_timeout_ms", self.request_timeout_ms),
            ("poll_interval_ms", self.poll_interval_ms),
            ("poll_retry_ms", self.poll_retry_ms),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, v)| *v == 0) {
            return Err(Error::Config(format!("{name} must be greater than zero")));
        }

        if self.display_brightness > MAX_DISPLAY_BRIGHTNESS {
            return Err(Error::Config(format!(
                "display_brightness must be 0-{MAX_DISPLAY_BRIGHTNESS}, got {}",
                self.display_brightness
            )));
        }

        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "server_url must be an http(s) URL, got '{}'",
                self.server_url
            )));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn bounce_window(&self) -> Duration {
        Duration::from_millis(self.bounce_window_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_retry(&self) -> Duration {
        Duration::from_millis(self.poll_retry_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config_is_valid() {
        let config = StationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bounce_window(), Duration::from_millis(200));
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.poll_retry(), Duration::from_secs(1));
        assert_eq!(config.server_url, "http://localhost");
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = StationConfig::from_toml_str("").unwrap();
        assert_eq!(config, StationConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = StationConfig::from_toml_str(
            r#"
            bounce_window_ms = 50
            ack_receipt = false
            "#,
        )
        .unwrap();
        assert_eq!(config.bounce_window_ms, 50);
        assert!(!config.ack_receipt);
        assert_eq!(config.lamp_pin, DEFAULT_LAMP_PIN);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = StationConfig::from_toml_str("lamp = 3");
        assert!(matches!(result, Err(Error::ConfigParse(_))));
    }

    #[test]
    fn test_blank_device_id_rejected() {
        let result = StationConfig::from_toml_str(r#"device_id = "  ""#);
        assert!(result.is_err());
    }

    #[rstest]
    #[case("start_button_pin = 20")]
    #[case("lamp_pin = 21")]
    #[case("end_button_pin = 26")]
    fn test_duplicate_pins_rejected(#[case] text: &str) {
        let result = StationConfig::from_toml_str(text);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[rstest]
    #[case("poll_interval_ms = 0")]
    #[case("poll_retry_ms = 0")]
    #[case("request_timeout_ms = 0")]
    #[case("display_brightness = 16")]
    #[case(r#"server_url = "localhost:8080""#)]
    fn test_invalid_values_rejected(#[case] text: &str) {
        let result = StationConfig::from_toml_str(text);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = StationConfig::load("/nonexistent/queuepost.toml");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
