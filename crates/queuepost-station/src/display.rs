//! Ticket announcement on the segment indicator.
//!
//! The driver owns a [`SegmentDisplay`] and knows how a ticket is announced:
//! the formatted number blinks a fixed number of times and then stays lit
//! until the job is finished.
//!
//! ```text
//!  " 042" ▕▔▔▔▔▏    ▕▔▔▔▔▏    ▕▔▔▔▔▏    ▕▔▔▔▔▔▔▔▔▔▔▔▔ ...
//!  blank  ▏    ▕▁▁▁▁▏    ▕▁▁▁▁▏    ▕▁▁▁▁▏
//!          500ms  400ms
//! ```

use std::time::Duration;

use queuepost_core::JobId;
use queuepost_core::constants::{BLINK_BLANK_MS, BLINK_COUNT, BLINK_SHOW_MS};
use queuepost_hardware::{Result, SegmentDisplay};
use tokio::time::sleep;
use tracing::{debug, trace};

/// Timing of the announcement blink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkTiming {
    /// How long the ticket is shown in each blink.
    pub show: Duration,

    /// How long the display stays blank after each blink.
    pub blank: Duration,

    /// Number of show/blank pairs before the ticket stays lit.
    pub count: usize,
}

impl Default for BlinkTiming {
    fn default() -> Self {
        Self {
            show: Duration::from_millis(BLINK_SHOW_MS),
            blank: Duration::from_millis(BLINK_BLANK_MS),
            count: BLINK_COUNT,
        }
    }
}

/// Drives the segment indicator for the job cycle.
#[derive(Debug)]
pub struct DisplayDriver<D> {
    device: D,
    timing: BlinkTiming,
}

impl<D: SegmentDisplay> DisplayDriver<D> {
    /// Blank the display, set its brightness and wrap it.
    ///
    /// # Errors
    ///
    /// Returns the device error if the display rejects the brightness or
    /// cannot be cleared.
    pub async fn init(mut device: D, brightness: u8) -> Result<Self> {
        device.clear().await?;
        device.set_brightness(brightness).await?;
        debug!(brightness, "Segment display initialized");

        Ok(Self {
            device,
            timing: BlinkTiming::default(),
        })
    }

    /// Replace the blink timing.
    pub fn with_timing(mut self, timing: BlinkTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Blink `id` and leave it lit.
    ///
    /// Returns once the final steady frame has been written.
    pub async fn announce(&mut self, id: &JobId) -> Result<()> {
        let text = id.display_text();
        debug!(%id, text = %text, "Announcing ticket");

        for round in 0..self.timing.count {
            trace!(round, "Blink");
            self.device.write_text(&text).await?;
            sleep(self.timing.show).await;
            self.device.clear().await?;
            sleep(self.timing.blank).await;
        }

        self.device.write_text(&text).await
    }

    /// Blank the display.
    pub async fn clear(&mut self) -> Result<()> {
        self.device.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use queuepost_hardware::HardwareContext;
    use queuepost_hardware::mock::{MockDisplay, MockDisplayHandle};
    use tokio::time::Instant;

    async fn driver() -> (HardwareContext, DisplayDriver<MockDisplay>, MockDisplayHandle) {
        let context = HardwareContext::new();
        let (display, handle) = MockDisplay::new(&context).unwrap();
        let driver = DisplayDriver::init(display, 7).await.unwrap();
        (context, driver, handle)
    }

    #[tokio::test]
    async fn test_init_blanks_and_sets_brightness() {
        let (_context, _driver, handle) = driver().await;

        assert_eq!(handle.texts(), vec![None]);
        assert_eq!(handle.brightness(), Some(7));
    }

    #[tokio::test]
    async fn test_init_rejects_bad_brightness() {
        let context = HardwareContext::new();
        let (display, _handle) = MockDisplay::new(&context).unwrap();

        assert!(DisplayDriver::init(display, 16).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_announce_frame_sequence() {
        let (_context, mut driver, handle) = driver().await;
        let started = Instant::now();

        driver.announce(&JobId::from(42)).await.unwrap();

        let shown = Some(" 042".to_string());
        assert_eq!(
            handle.texts(),
            vec![
                None,
                shown.clone(),
                None,
                shown.clone(),
                None,
                shown.clone(),
                None,
                shown.clone(),
            ]
        );
        assert_eq!(handle.shown(), shown);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(2700));
        assert!(elapsed < Duration::from_millis(2710));
    }

    #[tokio::test(start_paused = true)]
    async fn test_announce_frame_timing() {
        let (_context, mut driver, handle) = driver().await;
        let started = Instant::now();

        driver.announce(&JobId::from(5)).await.unwrap();

        let frames = handle.frames();
        let expected = [0, 500, 900, 1400, 1800, 2300, 2700];
        assert_eq!(frames.len(), expected.len() + 1);

        for (frame, expected_ms) in frames[1..].iter().zip(expected) {
            let offset = frame.at.duration_since(started).as_millis() as u64;
            assert!(
                offset.abs_diff(expected_ms) <= 5,
                "frame at {offset}ms, expected {expected_ms}ms"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_announce_custom_timing() {
        let (_context, driver, handle) = driver().await;
        let mut driver = driver.with_timing(BlinkTiming {
            show: Duration::from_millis(100),
            blank: Duration::from_millis(50),
            count: 1,
        });

        driver.announce(&JobId::from(1)).await.unwrap();
        assert_eq!(handle.texts().len(), 4);
    }

    #[tokio::test]
    async fn test_announce_propagates_write_failure() {
        let (_context, mut driver, handle) = driver().await;
        handle.set_fail_writes(true);

        assert!(driver.announce(&JobId::from(1)).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_after_announce() {
        let (_context, mut driver, handle) = driver().await;
        driver.announce(&JobId::from(7)).await.unwrap();
        assert_eq!(handle.shown(), Some(" 007".to_string()));

        driver.clear().await.unwrap();
        assert_eq!(handle.shown(), None);
    }
}
