//! Queue station controller.
//!
//! This crate contains the job cycle for a queue station: poll the queue
//! server for a ticket, announce it on the segment display, and report the
//! start and end of service as the operator presses the two buttons.

pub mod controller;
pub mod display;
pub mod error;
pub mod lamp;
pub mod state_machine;

pub use controller::{ControllerTiming, CycleOutcome, JobController};
pub use display::{BlinkTiming, DisplayDriver};
pub use error::{Result, StationError};
pub use lamp::{FlashTiming, StatusLamp};
pub use state_machine::{JobPhase, PhaseMachine, PhaseTransition};
