//! Job lifecycle state machine.
//!
//! This module tracks which phase of a job cycle the station is in and
//! rejects any phase change that does not follow the cycle.
//!
//! # Phases
//!
//! - `Idle`: between cycles
//! - `AwaitingJob`: polling the queue server for a ticket
//! - `Announced`: ticket received, announcement playing
//! - `AwaitingStart`: waiting for the start button
//! - `InProgress`: start reported, lamp set
//! - `AwaitingEnd`: waiting for the end button
//! - `Completing`: end reported, display being cleared
//!
//! # Valid Transitions
//!
//! - Idle → AwaitingJob → (AwaitingJob)* → Announced
//! - Announced → AwaitingStart → InProgress → AwaitingEnd → Completing → Idle
//!
//! # Examples
//!
//! ```
//! use queuepost_station::{JobPhase, PhaseMachine};
//!
//! let mut machine = PhaseMachine::new();
//! assert_eq!(machine.current_phase(), JobPhase::Idle);
//!
//! machine.transition_to(JobPhase::AwaitingJob).unwrap();
//! assert!(machine.transition_to(JobPhase::InProgress).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use queuepost_core::{Error, Result};

/// Maximum number of phase transitions to keep in history.
///
/// A full job cycle is seven transitions, so this covers the last dozen or
/// so cycles plus poll retries.
const MAX_HISTORY_SIZE: usize = 100;

/// Phases of one job cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    /// Between cycles; the display is blank and the lamp off.
    Idle,

    /// Polling the queue server for the next ticket.
    AwaitingJob,

    /// A ticket was received and is being announced.
    Announced,

    /// Announcement finished; waiting for the start button.
    AwaitingStart,

    /// Job start reported and the lamp set.
    InProgress,

    /// Waiting for the end button.
    AwaitingEnd,

    /// Job end reported; clearing the display.
    Completing,
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase_str = match self {
            JobPhase::Idle => "Idle",
            JobPhase::AwaitingJob => "AwaitingJob",
            JobPhase::Announced => "Announced",
            JobPhase::AwaitingStart => "AwaitingStart",
            JobPhase::InProgress => "InProgress",
            JobPhase::AwaitingEnd => "AwaitingEnd",
            JobPhase::Completing => "Completing",
        };
        write!(f, "{}", phase_str)
    }
}

impl JobPhase {
    /// Check if moving to `target` follows the job cycle.
    ///
    /// # Examples
    ///
    /// ```
    /// use queuepost_station::JobPhase;
    ///
    /// assert!(JobPhase::AwaitingJob.can_transition_to(&JobPhase::AwaitingJob));
    /// assert!(JobPhase::Completing.can_transition_to(&JobPhase::Idle));
    /// assert!(!JobPhase::AwaitingStart.can_transition_to(&JobPhase::Completing));
    /// ```
    pub fn can_transition_to(&self, target: &JobPhase) -> bool {
        matches!(
            (self, target),
            (JobPhase::Idle, JobPhase::AwaitingJob)
                | (JobPhase::AwaitingJob, JobPhase::AwaitingJob | JobPhase::Announced)
                | (JobPhase::Announced, JobPhase::AwaitingStart)
                | (JobPhase::AwaitingStart, JobPhase::InProgress)
                | (JobPhase::InProgress, JobPhase::AwaitingEnd)
                | (JobPhase::AwaitingEnd, JobPhase::Completing)
                | (JobPhase::Completing, JobPhase::Idle)
        )
    }

    /// Whether a ticket is held in this phase.
    pub fn holds_job(&self) -> bool {
        !matches!(self, JobPhase::Idle | JobPhase::AwaitingJob)
    }
}

/// A single phase change with timestamp.
///
/// The `timestamp` field is not serialized as `Instant` is process-specific.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: JobPhase,
    pub to: JobPhase,

    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl PhaseTransition {
    pub fn new(from: JobPhase, to: JobPhase) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// Validating tracker for the job cycle.
///
/// Not thread-safe; owned by the controller.
#[derive(Debug)]
pub struct PhaseMachine {
    current_phase: JobPhase,
    history: VecDeque<PhaseTransition>,
    completed_cycles: u64,
}

impl PhaseMachine {
    /// Create a machine in the `Idle` phase.
    pub fn new() -> Self {
        Self {
            current_phase: JobPhase::Idle,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            completed_cycles: 0,
        }
    }

    pub fn current_phase(&self) -> JobPhase {
        self.current_phase
    }

    /// Number of times the cycle returned from `Completing` to `Idle`.
    pub fn completed_cycles(&self) -> u64 {
        self.completed_cycles
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<PhaseTransition> {
        &self.history
    }

    /// Move to `new_phase` if the cycle allows it.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPhaseTransition` if the move skips or reverses
    /// a phase. The current phase is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use queuepost_station::{JobPhase, PhaseMachine};
    ///
    /// let mut machine = PhaseMachine::new();
    /// let transition = machine.transition_to(JobPhase::AwaitingJob).unwrap();
    /// assert_eq!(transition.from, JobPhase::Idle);
    ///
    /// assert!(machine.transition_to(JobPhase::Completing).is_err());
    /// assert_eq!(machine.current_phase(), JobPhase::AwaitingJob);
    /// ```
    pub fn transition_to(&mut self, new_phase: JobPhase) -> Result<PhaseTransition> {
        if !self.current_phase.can_transition_to(&new_phase) {
            return Err(Error::InvalidPhaseTransition {
                from: self.current_phase.to_string(),
                to: new_phase.to_string(),
            });
        }

        let transition = PhaseTransition::new(self.current_phase, new_phase);
        if self.current_phase == JobPhase::Completing && new_phase == JobPhase::Idle {
            self.completed_cycles += 1;
        }
        self.perform_phase_change(new_phase, transition.clone());

        Ok(transition)
    }

    /// Force the machine back to `Idle` regardless of the current phase.
    ///
    /// Used when the cycle is abandoned on shutdown.
    pub fn reset(&mut self) -> PhaseTransition {
        let transition = PhaseTransition::new(self.current_phase, JobPhase::Idle);
        self.perform_phase_change(JobPhase::Idle, transition.clone());
        transition
    }

    fn perform_phase_change(&mut self, new_phase: JobPhase, transition: PhaseTransition) {
        self.current_phase = new_phase;

        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}
