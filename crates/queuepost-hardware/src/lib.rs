//! Hardware abstraction layer for the queue station.
//!
//! This crate provides the pieces of the station that touch physical
//! hardware: the segment indicator and status lamp traits, debounced
//! button edge capture, and the process-wide [`HardwareContext`] that owns
//! every pin and bus for the lifetime of the process.
//!
//! # Design Philosophy
//!
//! - **Async-first**: output devices use native `async fn` in traits
//!   (Edition 2024 RPITIT).
//! - **Lock-free inputs**: button edges are recorded through atomics so the
//!   notification callback never blocks.
//! - **Single ownership**: each pin or bus is claimed by exactly one device
//!   and released exactly once.
//! - **Error-aware**: all operations return [`Result<T>`] with
//!   [`HardwareError`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use queuepost_hardware::{ButtonChannel, ButtonInput, HardwareContext};
//! use queuepost_hardware::mock::{MockDisplay, MockLamp};
//! use queuepost_hardware::traits::{LampOutput, SegmentDisplay};
//!
//! # async fn example() -> queuepost_hardware::Result<()> {
//! let context = HardwareContext::new();
//! let (mut display, _) = MockDisplay::new(&context)?;
//! let (mut lamp, _) = MockLamp::new(&context, 26)?;
//! let buttons = ButtonInput::new(&context, 21, 20, Duration::from_millis(200))?;
//!
//! display.write_text(" 042").await?;
//! buttons.wait_for(ButtonChannel::Start, Duration::from_millis(10)).await;
//! lamp.set_level(true).await?;
//!
//! context.release();
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod edge;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use context::HardwareContext;
pub use edge::{ButtonInput, EdgeLatch, EdgeSignaller};
pub use error::{HardwareError, Result};
pub use traits::{LampOutput, SegmentDisplay};
pub use types::{ButtonChannel, DeviceInfo, Resource};
