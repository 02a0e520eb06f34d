//! Mock button panel for testing and development.
//!
//! Plays the role of the GPIO interrupt callback: it pushes edges into a
//! [`ButtonInput`] through its signallers, including bursts that imitate
//! contact bounce.

use std::time::Duration;

use tokio::time::Instant;

use crate::edge::{ButtonInput, EdgeSignaller};
use crate::types::ButtonChannel;

/// Simulated start/end buttons wired to a [`ButtonInput`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use queuepost_hardware::{ButtonChannel, ButtonInput, HardwareContext};
/// use queuepost_hardware::mock::MockButtonPanel;
///
/// let context = HardwareContext::new();
/// let buttons = ButtonInput::new(&context, 21, 20, Duration::from_millis(200)).unwrap();
/// let panel = MockButtonPanel::new(&buttons);
///
/// panel.bounce(ButtonChannel::Start, 5);
/// assert!(buttons.consume(ButtonChannel::Start));
/// assert!(!buttons.consume(ButtonChannel::Start));
/// ```
#[derive(Debug, Clone)]
pub struct MockButtonPanel {
    start: EdgeSignaller,
    end: EdgeSignaller,
}

impl MockButtonPanel {
    pub fn new(buttons: &ButtonInput) -> Self {
        Self {
            start: buttons.signaller(ButtonChannel::Start),
            end: buttons.signaller(ButtonChannel::End),
        }
    }

    /// One clean press. Returns whether the edge was accepted.
    pub fn press(&self, channel: ButtonChannel) -> bool {
        self.signaller(channel).signal()
    }

    /// A press followed by `count - 1` bounce transitions one millisecond
    /// apart. Returns how many edges were accepted.
    pub fn bounce(&self, channel: ButtonChannel, count: usize) -> usize {
        let signaller = self.signaller(channel);
        let base = Instant::now();
        (0..count)
            .filter(|i| signaller.signal_at(base + Duration::from_millis(*i as u64)))
            .count()
    }

    pub fn press_start(&self) -> bool {
        self.press(ButtonChannel::Start)
    }

    pub fn press_end(&self) -> bool {
        self.press(ButtonChannel::End)
    }

    fn signaller(&self, channel: ButtonChannel) -> &EdgeSignaller {
        match channel {
            ButtonChannel::Start => &self.start,
            ButtonChannel::End => &self.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HardwareContext;

    fn buttons(window_ms: u64) -> (HardwareContext, ButtonInput) {
        let context = HardwareContext::new();
        let buttons =
            ButtonInput::new(&context, 21, 20, Duration::from_millis(window_ms)).unwrap();
        (context, buttons)
    }

    #[test]
    fn test_press_records_edge() {
        let (_context, buttons) = buttons(200);
        let panel = MockButtonPanel::new(&buttons);

        assert!(panel.press_end());
        assert!(buttons.consume(ButtonChannel::End));
        assert!(!buttons.consume(ButtonChannel::Start));
    }

    #[test]
    fn test_bounce_accepts_one_edge() {
        let (_context, buttons) = buttons(200);
        let panel = MockButtonPanel::new(&buttons);

        assert_eq!(panel.bounce(ButtonChannel::Start, 10), 1);
        assert!(buttons.consume(ButtonChannel::Start));
        assert!(!buttons.consume(ButtonChannel::Start));
        assert_eq!(buttons.suppressed_count(ButtonChannel::Start), 9);
    }

    #[test]
    fn test_bounce_without_window_collapses() {
        let (_context, buttons) = buttons(0);
        let panel = MockButtonPanel::new(&buttons);

        assert_eq!(panel.bounce(ButtonChannel::End, 4), 4);
        assert!(buttons.consume(ButtonChannel::End));
        assert!(!buttons.consume(ButtonChannel::End));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bursts_seconds_apart_both_accepted() {
        let (_context, buttons) = buttons(200);
        let panel = MockButtonPanel::new(&buttons);

        assert_eq!(panel.bounce(ButtonChannel::End, 5), 1);
        assert!(buttons.consume(ButtonChannel::End));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(panel.bounce(ButtonChannel::End, 5), 1);
        assert!(buttons.consume(ButtonChannel::End));
        assert_eq!(buttons.suppressed_count(ButtonChannel::End), 8);
    }
}
