//! The job cycle controller.
//!
//! [`JobController`] ties the queue service, the segment display, the
//! status lamp and the button inputs together and runs the job cycle until
//! it is cancelled or something unrecoverable happens.
//!
//! ```text
//!  ┌──────────┐ none, wait 1s ┌─────────────┐
//!  │   Idle   │──────────────►│ AwaitingJob │◄─┐
//!  └──────────┘               └─────────────┘──┘
//!       ▲                            │ job id
//!       │ clear                      ▼
//!  ┌────────────┐            ┌─────────────┐
//!  │ Completing │            │  Announced  │ blink x3, steady
//!  └────────────┘            └─────────────┘
//!       ▲ job_end, lamp off          │
//!       │ (flash on failure)         ▼
//!  ┌─────────────┐           ┌───────────────┐
//!  │ AwaitingEnd │           │ AwaitingStart │
//!  └─────────────┘           └───────────────┘
//!       ▲                            │ start edge, job_start, lamp on
//!       │                            ▼ (flash first on failure)
//!       │                    ┌────────────┐
//!       └────────────────────│ InProgress │
//!                            └────────────┘
//! ```
//!
//! # Shutdown
//!
//! [`JobController::run`] owns the controller, so cleanup runs exactly once
//! whichever way the loop ends: cancellation, a device error, or a panic
//! inside the cycle. Cleanup blanks the display, turns the lamp off and
//! releases the [`HardwareContext`].

use std::any::Any;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use queuepost_core::{JobId, StationConfig};
use queuepost_hardware::{ButtonChannel, ButtonInput, HardwareContext, LampOutput, SegmentDisplay};
use queuepost_network::QueueService;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::display::DisplayDriver;
use crate::error::{Result, StationError};
use crate::lamp::StatusLamp;
use crate::state_machine::{JobPhase, PhaseMachine, PhaseTransition};

/// Waits used by the controller loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerTiming {
    /// Pause after a poll that produced no job.
    pub poll_retry: Duration,

    /// How often a button wait checks its latch.
    pub poll_interval: Duration,
}

impl ControllerTiming {
    pub fn from_config(config: &StationConfig) -> Self {
        Self {
            poll_retry: config.poll_retry(),
            poll_interval: config.poll_interval(),
        }
    }
}

impl Default for ControllerTiming {
    fn default() -> Self {
        Self::from_config(&StationConfig::default())
    }
}

/// What happened during one completed job cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    pub id: JobId,
    pub start_acknowledged: bool,
    pub end_acknowledged: bool,
}

/// Runs the station's job cycle.
///
/// Generic over the queue service and the two output devices so that the
/// same loop drives real hardware, the console backend and test mocks.
pub struct JobController<Q, D, L> {
    queue: Q,
    display: DisplayDriver<D>,
    lamp: StatusLamp<L>,
    buttons: ButtonInput,
    timing: ControllerTiming,
    machine: PhaseMachine,
}

impl<Q, D, L> JobController<Q, D, L>
where
    Q: QueueService,
    D: SegmentDisplay,
    L: LampOutput,
{
    pub fn new(
        queue: Q,
        display: DisplayDriver<D>,
        lamp: StatusLamp<L>,
        buttons: ButtonInput,
    ) -> Self {
        Self {
            queue,
            display,
            lamp,
            buttons,
            timing: ControllerTiming::default(),
            machine: PhaseMachine::new(),
        }
    }

    pub fn with_timing(mut self, timing: ControllerTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn phase(&self) -> JobPhase {
        self.machine.current_phase()
    }

    /// Recent phase transitions, oldest first.
    pub fn history(&self) -> &VecDeque<PhaseTransition> {
        self.machine.history()
    }

    /// Run job cycles until `shutdown` is cancelled, then clean up.
    ///
    /// Returns `Ok(())` after a requested shutdown. A device error, an
    /// invalid phase change or a panic inside the cycle also ends the loop;
    /// cleanup still runs and the failure is returned.
    pub async fn run(mut self, context: &HardwareContext, shutdown: CancellationToken) -> Result<()> {
        info!("Job controller started");

        let outcome = {
            let cycles = AssertUnwindSafe(self.run_cycles()).catch_unwind();
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested");
                    Ok(())
                }
                result = cycles => match result {
                    Ok(Ok(never)) => match never {},
                    Ok(Err(e)) => {
                        error!(error = %e, "Job cycle failed");
                        Err(e)
                    }
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        error!(panic_msg = %message, "Job cycle panicked");
                        Err(StationError::Panicked(message))
                    }
                },
            }
        };

        self.cleanup(context).await;
        outcome
    }

    async fn run_cycles(&mut self) -> Result<Infallible> {
        loop {
            let outcome = self.run_cycle().await?;
            info!(
                id = %outcome.id,
                start_ack = outcome.start_acknowledged,
                end_ack = outcome.end_acknowledged,
                cycles = self.machine.completed_cycles(),
                "Job cycle complete"
            );
        }
    }

    /// Run one job cycle from `Idle` back to `Idle`.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let id = self.await_job().await?;

        self.enter(JobPhase::Announced)?;
        self.buttons.discard(ButtonChannel::Start);
        self.buttons.discard(ButtonChannel::End);
        self.display.announce(&id).await?;

        self.enter(JobPhase::AwaitingStart)?;
        self.buttons
            .wait_for(ButtonChannel::Start, self.timing.poll_interval)
            .await;
        info!(%id, "Start button pressed");
        self.buttons.discard(ButtonChannel::End);

        let start_acknowledged = self.queue.notify_job_start(&id).await;
        if !start_acknowledged {
            warn!(%id, "Job start not acknowledged");
            self.lamp.flash().await?;
        }
        self.lamp.on().await?;
        self.enter(JobPhase::InProgress)?;

        self.enter(JobPhase::AwaitingEnd)?;
        self.buttons
            .wait_for(ButtonChannel::End, self.timing.poll_interval)
            .await;
        info!(%id, "End button pressed");

        let end_acknowledged = self.queue.notify_job_end(&id).await;
        if end_acknowledged {
            self.lamp.off().await?;
        } else {
            warn!(%id, "Job end not acknowledged");
            self.lamp.flash().await?;
        }

        self.enter(JobPhase::Completing)?;
        self.display.clear().await?;
        self.enter(JobPhase::Idle)?;

        Ok(CycleOutcome {
            id,
            start_acknowledged,
            end_acknowledged,
        })
    }

    async fn await_job(&mut self) -> Result<JobId> {
        self.enter(JobPhase::AwaitingJob)?;
        loop {
            if let Some(id) = self.queue.poll_for_job().await {
                return Ok(id);
            }
            sleep(self.timing.poll_retry).await;
            self.enter(JobPhase::AwaitingJob)?;
        }
    }

    fn enter(&mut self, phase: JobPhase) -> Result<()> {
        let transition = self.machine.transition_to(phase)?;
        debug!(from = %transition.from, to = %transition.to, "Phase change");
        Ok(())
    }

    async fn cleanup(&mut self, context: &HardwareContext) {
        let abandoned = self.machine.reset();
        if abandoned.from.holds_job() {
            info!(phase = %abandoned.from, "Abandoning job in progress");
        }

        if let Err(e) = self.display.clear().await {
            warn!(error = %e, "Failed to clear display during cleanup");
        }
        if let Err(e) = self.lamp.off().await {
            warn!(error = %e, "Failed to turn lamp off during cleanup");
        }

        if context.release() {
            info!("Hardware released");
        } else {
            debug!("Hardware already released");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
