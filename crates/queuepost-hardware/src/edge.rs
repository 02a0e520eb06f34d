//! Debounced button edge capture.
//!
//! Each button owns an [`EdgeLatch`]: a one-bit mailbox written by the
//! hardware notification source (an interrupt-style callback that may run on
//! any thread) and drained by the control loop. The producer side is an
//! [`EdgeSignaller`] handed to the backend; the consumer side is
//! [`ButtonInput::consume`].
//!
//! ```text
//!  GPIO callback ──signal()──► EdgeLatch ◄──consume()── control loop
//!                              (pending: AtomicBool,
//!                               last_accepted: AtomicU64)
//! ```
//!
//! The latch never blocks and never takes a lock, so `signal()` is safe to
//! call from a callback context. Edge times come from the tokio clock, which
//! reads the system monotonic clock outside a runtime and follows the paused
//! clock in tests.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use queuepost_hardware::{ButtonChannel, ButtonInput, HardwareContext};
//!
//! let context = HardwareContext::new();
//! let buttons = ButtonInput::new(&context, 21, 20, Duration::from_millis(200)).unwrap();
//!
//! let start = buttons.signaller(ButtonChannel::Start);
//! start.signal();
//! start.signal(); // bounce, suppressed
//!
//! assert!(buttons.consume(ButtonChannel::Start));
//! assert!(!buttons.consume(ButtonChannel::Start));
//! assert!(!buttons.consume(ButtonChannel::End));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::context::HardwareContext;
use crate::error::Result;
use crate::types::{ButtonChannel, Resource};

/// Sentinel for "no edge accepted yet".
const NEVER: u64 = u64::MAX;

/// Atomic test-and-clear flag with bounce suppression.
#[derive(Debug)]
pub struct EdgeLatch {
    /// Edge recorded and not yet consumed.
    pending: AtomicBool,

    /// Nanoseconds since `origin` of the last accepted edge, or `NEVER`.
    last_accepted: AtomicU64,

    /// Edges dropped because they fell inside the window.
    suppressed: AtomicU64,

    origin: Instant,
    window: Duration,
}

impl EdgeLatch {
    /// Create a latch that ignores edges arriving within `window` of the
    /// previously accepted one.
    pub fn new(window: Duration) -> Self {
        Self {
            pending: AtomicBool::new(false),
            last_accepted: AtomicU64::new(NEVER),
            suppressed: AtomicU64::new(0),
            origin: Instant::now(),
            window,
        }
    }

    /// Record a rising edge observed now.
    ///
    /// Returns `true` if the edge was accepted, `false` if it was suppressed
    /// as bounce.
    pub fn signal(&self) -> bool {
        self.signal_at(Instant::now())
    }

    /// Record a rising edge observed at `at`.
    ///
    /// Timestamps earlier than the last accepted edge count as bounce.
    pub fn signal_at(&self, at: Instant) -> bool {
        let now = self.ticks(at);
        let window = u64::try_from(self.window.as_nanos()).unwrap_or(u64::MAX);

        let mut last = self.last_accepted.load(Ordering::Acquire);
        loop {
            if last != NEVER && now.saturating_sub(last) < window {
                self.suppressed.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            match self.last_accepted.compare_exchange_weak(
                last,
                now,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => last = actual,
            }
        }

        self.pending.store(true, Ordering::Release);
        true
    }

    /// Return whether an edge is pending and clear it in the same step.
    pub fn consume(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Number of edges dropped as bounce since creation.
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }

    fn ticks(&self, at: Instant) -> u64 {
        let nanos = at.saturating_duration_since(self.origin).as_nanos();
        // NEVER stays reserved
        u64::try_from(nanos).unwrap_or(NEVER - 1).min(NEVER - 1)
    }
}

/// Producer handle for one button, given to the hardware notification source.
#[derive(Debug, Clone)]
pub struct EdgeSignaller {
    channel: ButtonChannel,
    latch: Arc<EdgeLatch>,
}

impl EdgeSignaller {
    /// Record an edge on this button now.
    pub fn signal(&self) -> bool {
        let accepted = self.latch.signal();
        trace!(channel = %self.channel, accepted, "button edge");
        accepted
    }

    /// Record an edge on this button at `at`.
    pub fn signal_at(&self, at: Instant) -> bool {
        let accepted = self.latch.signal_at(at);
        trace!(channel = %self.channel, accepted, "button edge");
        accepted
    }

    pub fn channel(&self) -> ButtonChannel {
        self.channel
    }
}

/// Debounced edge capture for the start and end buttons.
#[derive(Debug)]
pub struct ButtonInput {
    start: Arc<EdgeLatch>,
    end: Arc<EdgeLatch>,
}

impl ButtonInput {
    /// Claim both button pins from `context` and set up their latches.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::ResourceInUse` if either pin is already owned,
    /// or `HardwareError::Released` if the context has been torn down.
    pub fn new(
        context: &HardwareContext,
        start_pin: u8,
        end_pin: u8,
        bounce_window: Duration,
    ) -> Result<Self> {
        context.claim(Resource::Pin(start_pin), "start button")?;
        context.claim(Resource::Pin(end_pin), "end button")?;

        debug!(
            start_pin,
            end_pin,
            bounce_ms = bounce_window.as_millis() as u64,
            "Button inputs configured for rising edges"
        );

        Ok(Self {
            start: Arc::new(EdgeLatch::new(bounce_window)),
            end: Arc::new(EdgeLatch::new(bounce_window)),
        })
    }

    /// Producer handle for `channel`.
    pub fn signaller(&self, channel: ButtonChannel) -> EdgeSignaller {
        EdgeSignaller {
            channel,
            latch: Arc::clone(self.latch(channel)),
        }
    }

    /// Whether `channel` saw an edge since the last call; clears the record.
    pub fn consume(&self, channel: ButtonChannel) -> bool {
        self.latch(channel).consume()
    }

    /// Drop any edge recorded on `channel` so far.
    pub fn discard(&self, channel: ButtonChannel) {
        if self.consume(channel) {
            debug!(%channel, "Discarded stale button edge");
        }
    }

    /// Poll `channel` every `poll_interval` until an edge is consumed.
    pub async fn wait_for(&self, channel: ButtonChannel, poll_interval: Duration) {
        while !self.consume(channel) {
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Edges suppressed as bounce on `channel`.
    pub fn suppressed_count(&self, channel: ButtonChannel) -> u64 {
        self.latch(channel).suppressed_count()
    }

    fn latch(&self, channel: ButtonChannel) -> &Arc<EdgeLatch> {
        match channel {
            ButtonChannel::Start => &self.start,
            ButtonChannel::End => &self.end,
        }
    }
}
