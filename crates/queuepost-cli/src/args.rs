//! Command-line arguments and configuration layering.
//!
//! Configuration is built in three layers, later layers winning:
//! built-in defaults, the optional TOML file, then flags (each flag can
//! also be set through its `QUEUEPOST_*` environment variable).

use std::path::PathBuf;

use clap::Parser;
use queuepost_core::{DeviceToken, Result, StationConfig};

#[derive(Parser, Debug)]
#[command(name = "queuepost")]
#[command(version)]
#[command(about = "Queue station controller: announces tickets and reports service start and end")]
pub struct Args {
    /// Path to a TOML configuration file
    #[arg(long, short = 'c', env = "QUEUEPOST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Identifier sent with every queue request
    #[arg(long, env = "QUEUEPOST_DEVICE_ID")]
    pub device_id: Option<String>,

    /// Queue server endpoint
    #[arg(long, env = "QUEUEPOST_SERVER_URL")]
    pub server_url: Option<String>,

    /// Timeout for one queue request, in milliseconds
    #[arg(long, env = "QUEUEPOST_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Do not acknowledge receipt of polled tickets
    #[arg(long)]
    pub no_ack: bool,

    /// GPIO pin of the start button
    #[arg(long)]
    pub start_pin: Option<u8>,

    /// GPIO pin of the end button
    #[arg(long)]
    pub end_pin: Option<u8>,

    /// GPIO pin of the status lamp
    #[arg(long)]
    pub lamp_pin: Option<u8>,

    /// Button bounce window, in milliseconds
    #[arg(long)]
    pub bounce_ms: Option<u64>,

    /// Delay between button checks, in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Delay before polling again after no ticket, in milliseconds
    #[arg(long)]
    pub poll_retry_ms: Option<u64>,

    /// Segment display brightness (0-15)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=15))]
    pub brightness: Option<u8>,

    /// Log level when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "QUEUEPOST_LOG")]
    pub log_level: String,
}

impl Args {
    /// Build and validate the station configuration.
    pub fn load_config(&self) -> Result<StationConfig> {
        let mut config = match &self.config {
            Some(path) => StationConfig::load(path)?,
            None => StationConfig::default(),
        };
        self.apply(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut StationConfig) -> Result<()> {
        if let Some(id) = &self.device_id {
            config.device_id = DeviceToken::new(id)?;
        }
        if let Some(url) = &self.server_url {
            config.server_url = url.clone();
        }
        if let Some(ms) = self.request_timeout_ms {
            config.request_timeout_ms = ms;
        }
        if self.no_ack {
            config.ack_receipt = false;
        }
        if let Some(pin) = self.start_pin {
            config.start_button_pin = pin;
        }
        if let Some(pin) = self.end_pin {
            config.end_button_pin = pin;
        }
        if let Some(pin) = self.lamp_pin {
            config.lamp_pin = pin;
        }
        if let Some(ms) = self.bounce_ms {
            config.bounce_window_ms = ms;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval_ms = ms;
        }
        if let Some(ms) = self.poll_retry_ms {
            config.poll_retry_ms = ms;
        }
        if let Some(level) = self.brightness {
            config.display_brightness = level;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Args {
        let mut full = vec!["queuepost"];
        full.extend_from_slice(args);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_defaults_without_arguments() {
        let args = parse(&[]);
        assert_eq!(args.log_level, "info");

        let config = args.load_config().unwrap();
        assert_eq!(config, StationConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "--device-id",
            "4",
            "--server-url",
            "http://queue.local/api",
            "--lamp-pin",
            "19",
            "--no-ack",
            "--brightness",
            "3",
        ])
        .load_config()
        .unwrap();

        assert_eq!(config.device_id.as_str(), "4");
        assert_eq!(config.server_url, "http://queue.local/api");
        assert_eq!(config.lamp_pin, 19);
        assert!(!config.ack_receipt);
        assert_eq!(config.display_brightness, 3);
        assert_eq!(config.start_button_pin, 21);
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "device_id = \"9\"\nlamp_pin = 12\npoll_retry_ms = 2500").unwrap();
        let path = file.path().to_str().unwrap();

        let config = parse(&["--config", path, "--lamp-pin", "13"])
            .load_config()
            .unwrap();

        assert_eq!(config.device_id.as_str(), "9");
        assert_eq!(config.lamp_pin, 13);
        assert_eq!(config.poll_retry_ms, 2500);
    }

    #[test]
    fn test_pin_conflict_rejected() {
        let result = parse(&["--lamp-pin", "21"]).load_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_brightness_out_of_range_rejected_by_parser() {
        let result = Args::try_parse_from(["queuepost", "--brightness", "16"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let result = parse(&["--config", "/nonexistent/queuepost.toml"]).load_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_device_id_rejected() {
        let result = parse(&["--device-id", "  "]).load_config();
        assert!(result.is_err());
    }
}
