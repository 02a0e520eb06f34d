//! Mock status lamp for testing and development.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::time::Instant;

use crate::{
    HardwareContext, HardwareError, Result,
    traits::LampOutput,
    types::{DeviceInfo, Resource},
};

/// One recorded output level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LampEvent {
    pub on: bool,
    pub at: Instant,
}

#[derive(Debug, Default)]
struct LampState {
    events: Vec<LampEvent>,
    fail_writes: bool,
    released: usize,
}

/// Mock lamp bound to a GPIO pin.
///
/// The pin starts low, as a real output configured with a low initial level.
///
/// # Examples
///
/// ```
/// use queuepost_hardware::HardwareContext;
/// use queuepost_hardware::mock::MockLamp;
/// use queuepost_hardware::traits::LampOutput;
///
/// #[tokio::main]
/// async fn main() -> queuepost_hardware::Result<()> {
///     let context = HardwareContext::new();
///     let (mut lamp, handle) = MockLamp::new(&context, 26)?;
///
///     lamp.set_level(true).await?;
///     assert!(handle.is_on());
///     assert_eq!(handle.levels(), vec![true]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockLamp {
    state: Arc<Mutex<LampState>>,
    pin: u8,
}

impl MockLamp {
    /// Claim `pin` and create a mock lamp on it.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::ResourceInUse` if the pin is already owned.
    pub fn new(context: &HardwareContext, pin: u8) -> Result<(Self, MockLampHandle)> {
        context.claim(Resource::Pin(pin), "status lamp")?;

        let state = Arc::new(Mutex::new(LampState::default()));

        let hook_state = Arc::clone(&state);
        context.on_release(move || {
            let mut state = hook_state.lock().unwrap_or_else(|e| e.into_inner());
            state.released += 1;
        });

        let lamp = Self {
            state: Arc::clone(&state),
            pin,
        };
        Ok((lamp, MockLampHandle { state }))
    }
}

impl LampOutput for MockLamp {
    async fn set_level(&mut self, on: bool) -> Result<()> {
        let mut state = lock(&self.state);
        if state.released > 0 {
            return Err(HardwareError::released(format!("lamp on GPIO{}", self.pin)));
        }
        if state.fail_writes {
            return Err(HardwareError::communication("injected lamp failure"));
        }
        state.events.push(LampEvent {
            on,
            at: Instant::now(),
        });
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(format!("Mock Lamp GPIO{}", self.pin), "Mock Lamp v1.0"))
    }
}

/// Handle for inspecting and controlling a mock lamp.
#[derive(Debug, Clone)]
pub struct MockLampHandle {
    state: Arc<Mutex<LampState>>,
}

impl MockLampHandle {
    /// Every level written so far, with timestamps.
    pub fn events(&self) -> Vec<LampEvent> {
        lock(&self.state).events.clone()
    }

    /// Every level written so far.
    pub fn levels(&self) -> Vec<bool> {
        lock(&self.state).events.iter().map(|e| e.on).collect()
    }

    /// Current output level.
    pub fn is_on(&self) -> bool {
        lock(&self.state).events.last().is_some_and(|e| e.on)
    }

    /// Forget recorded events.
    pub fn clear_events(&self) {
        lock(&self.state).events.clear();
    }

    pub fn release_count(&self) -> usize {
        lock(&self.state).released
    }

    /// Make subsequent writes fail with a communication error.
    pub fn set_fail_writes(&self, fail: bool) {
        lock(&self.state).fail_writes = fail;
    }
}

fn lock(state: &Mutex<LampState>) -> MutexGuard<'_, LampState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}
