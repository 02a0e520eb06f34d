//! Status lamp patterns.

use std::time::Duration;

use queuepost_core::constants::{FLASH_COUNT, FLASH_STEP_MS};
use queuepost_hardware::{LampOutput, Result};
use tokio::time::sleep;
use tracing::debug;

/// Timing of the failure flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashTiming {
    /// Length of the leading dark period and of each on/off step.
    pub step: Duration,

    /// Number of on/off pulses.
    pub count: usize,
}

impl Default for FlashTiming {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(FLASH_STEP_MS),
            count: FLASH_COUNT,
        }
    }
}

/// Single-colour lamp showing whether a job is in progress.
///
/// A failed notification is signalled by [`StatusLamp::flash`], which always
/// leaves the lamp off.
#[derive(Debug)]
pub struct StatusLamp<L> {
    output: L,
    timing: FlashTiming,
    lit: bool,
}

impl<L: LampOutput> StatusLamp<L> {
    /// Drive the output low and wrap it.
    pub async fn init(mut output: L) -> Result<Self> {
        output.set_level(false).await?;
        Ok(Self {
            output,
            timing: FlashTiming::default(),
            lit: false,
        })
    }

    pub fn with_timing(mut self, timing: FlashTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub async fn on(&mut self) -> Result<()> {
        self.set(true).await
    }

    pub async fn off(&mut self) -> Result<()> {
        self.set(false).await
    }

    /// Off, one dark step, then `count` pulses of one step on and one off.
    pub async fn flash(&mut self) -> Result<()> {
        debug!(pulses = self.timing.count, "Flashing status lamp");

        self.set(false).await?;
        sleep(self.timing.step).await;
        for _ in 0..self.timing.count {
            self.set(true).await?;
            sleep(self.timing.step).await;
            self.set(false).await?;
            sleep(self.timing.step).await;
        }
        Ok(())
    }

    async fn set(&mut self, on: bool) -> Result<()> {
        self.output.set_level(on).await?;
        self.lit = on;
        Ok(())
    }
}
