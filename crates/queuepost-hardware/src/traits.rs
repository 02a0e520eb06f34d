//! Hardware device trait definitions.
//!
//! These traits are the contract between the station controller and its
//! output devices: the numeric segment indicator and the status lamp.
//! Button inputs are not a trait; edges are pushed into a
//! [`ButtonInput`](crate::ButtonInput) by whatever notification source the
//! backend provides.
//!
//! All traits use native `async fn` methods (Edition 2024 RPITIT), so they
//! are used through generic parameters rather than trait objects.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::DeviceInfo;

/// Numeric segment indicator.
///
/// Implementations render text as-is. Padding, truncation and blinking are
/// the caller's concern.
///
/// # Examples
///
/// ```no_run
/// use queuepost_hardware::traits::SegmentDisplay;
/// use queuepost_hardware::Result;
///
/// async fn show_ticket<D: SegmentDisplay>(display: &mut D) -> Result<()> {
///     display.set_brightness(7).await?;
///     display.write_text(" 042").await?;
///     Ok(())
/// }
/// ```
pub trait SegmentDisplay: Send {
    /// Show `text` starting at the leftmost digit.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the write or has been released.
    async fn write_text(&mut self, text: &str) -> Result<()>;

    /// Blank every digit.
    async fn clear(&mut self) -> Result<()>;

    /// Set intensity (0-15).
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InvalidData` for levels above 15.
    async fn set_brightness(&mut self, level: u8) -> Result<()>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Single binary output driving the status lamp.
///
/// # Examples
///
/// ```no_run
/// use queuepost_hardware::traits::LampOutput;
/// use queuepost_hardware::Result;
///
/// async fn blink_once<L: LampOutput>(lamp: &mut L) -> Result<()> {
///     lamp.set_level(true).await?;
///     lamp.set_level(false).await
/// }
/// ```
pub trait LampOutput: Send {
    /// Drive the output high (`true`) or low (`false`).
    async fn set_level(&mut self, on: bool) -> Result<()>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
