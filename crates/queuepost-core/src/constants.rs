//! Core constants for the queue station.
//!
//! This module centralizes the timing, wiring and protocol constants used by
//! the station controller. The defaults describe the reference build: a
//! Raspberry Pi with two push buttons, one status LED and a cascaded
//! MAX7219 seven-segment board.
//!
//! # Timing Overview
//!
//! | Constant | Value | Used by |
//! |----------|-------|---------|
//! | `DEFAULT_BOUNCE_WINDOW_MS` | 200 ms | button edge latch |
//! | `DEFAULT_POLL_INTERVAL_MS` | 10 ms | button waits |
//! | `DEFAULT_POLL_RETRY_MS` | 1000 ms | job poll retry |
//! | `BLINK_SHOW_MS` / `BLINK_BLANK_MS` | 500 / 400 ms | announcement |
//! | `FLASH_STEP_MS` | 500 ms | lamp failure flash |
//!
//! # Usage
//!
//! ```
//! use queuepost_core::constants::*;
//! use std::time::Duration;
//!
//! let retry = Duration::from_millis(DEFAULT_POLL_RETRY_MS);
//! assert_eq!(retry, Duration::from_secs(1));
//! assert_eq!(TASK_POLL, "req");
//! ```

// ============================================================================
// Pin Wiring (BCM numbering)
// ============================================================================

/// GPIO pin of the start button.
pub const DEFAULT_START_BUTTON_PIN: u8 = 21;

/// GPIO pin of the end button.
pub const DEFAULT_END_BUTTON_PIN: u8 = 20;

/// GPIO pin of the status lamp.
pub const DEFAULT_LAMP_PIN: u8 = 26;

// ============================================================================
// Timing
// ============================================================================

/// Bounce suppression window for button inputs, in milliseconds.
///
/// A rising edge that arrives within this window after an accepted edge on
/// the same line is ignored.
pub const DEFAULT_BOUNCE_WINDOW_MS: u64 = 200;

/// Sleep between button checks while waiting for an edge, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Delay before polling the server again after an empty or failed poll.
pub const DEFAULT_POLL_RETRY_MS: u64 = 1000;

/// Upper bound for a single queue server request, in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3000;

/// Time the ticket is shown during each announcement blink.
pub const BLINK_SHOW_MS: u64 = 500;

/// Time the display is blank during each announcement blink.
pub const BLINK_BLANK_MS: u64 = 400;

/// Number of blinks before the ticket is held steady.
pub const BLINK_COUNT: usize = 3;

/// Step duration of the lamp failure flash.
pub const FLASH_STEP_MS: u64 = 500;

/// Number of on/off pulses in a lamp failure flash.
pub const FLASH_COUNT: usize = 3;

// ============================================================================
// Display
// ============================================================================

/// Minimum number of characters a ticket is padded to (with `0`).
pub const TICKET_MIN_WIDTH: usize = 3;

/// Widest ticket text shown untruncated.
pub const TICKET_MAX_WIDTH: usize = 4;

/// Number of characters kept when a ticket is wider than `TICKET_MAX_WIDTH`.
pub const TICKET_TRUNCATED_WIDTH: usize = 3;

/// Default segment display intensity.
pub const DEFAULT_DISPLAY_BRIGHTNESS: u8 = 7;

/// Highest intensity accepted by the MAX7219 driver.
pub const MAX_DISPLAY_BRIGHTNESS: u8 = 15;

// ============================================================================
// Queue Protocol
// ============================================================================

/// Default queue server address.
pub const DEFAULT_SERVER_URL: &str = "http://localhost";

/// Default station identifier sent with every request.
pub const DEFAULT_DEVICE_ID: &str = "1";

/// Form field carrying the station identifier.
pub const FIELD_DEVICE_ID: &str = "device_id";

/// Form field carrying the request type.
pub const FIELD_TASK: &str = "task";

/// Form field carrying the job identifier.
pub const FIELD_ID: &str = "id";

/// Request type: ask the server for the next job.
pub const TASK_POLL: &str = "req";

/// Request type: confirm a polled job id was received.
pub const TASK_ACK: &str = "ack";

/// Request type: operator started the job.
pub const TASK_JOB_START: &str = "job_start";

/// Request type: operator finished the job.
pub const TASK_JOB_END: &str = "job_end";

/// Exact response body the server sends to acknowledge a notification.
///
/// Compared case-sensitively and without trimming.
pub const ACK_TOKEN: &str = "OK";
