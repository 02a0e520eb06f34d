//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled and
//! inspected programmatically without requiring physical hardware.

pub mod buttons;
pub mod display;
pub mod lamp;

// Re-export commonly used types
pub use buttons::MockButtonPanel;
pub use display::{DisplayFrame, MockDisplay, MockDisplayHandle};
pub use lamp::{LampEvent, MockLamp, MockLampHandle};
