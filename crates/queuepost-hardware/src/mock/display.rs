//! Mock segment display for testing and development.
//!
//! This module provides a simulated indicator that records every frame it is
//! asked to show, with a timestamp, so tests can check both what was
//! displayed and when.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::time::Instant;

use crate::{
    HardwareContext, HardwareError, Result,
    traits::SegmentDisplay,
    types::{DeviceInfo, Resource},
};

/// One recorded display update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFrame {
    /// Text shown, or `None` for a blank display.
    pub text: Option<String>,

    /// When the update was applied.
    pub at: Instant,
}

#[derive(Debug, Default)]
struct DisplayState {
    frames: Vec<DisplayFrame>,
    brightness: Option<u8>,
    fail_writes: bool,
    released: usize,
}

/// Mock segment display.
///
/// # Examples
///
/// ```
/// use queuepost_hardware::HardwareContext;
/// use queuepost_hardware::mock::MockDisplay;
/// use queuepost_hardware::traits::SegmentDisplay;
///
/// #[tokio::main]
/// async fn main() -> queuepost_hardware::Result<()> {
///     let context = HardwareContext::new();
///     let (mut display, handle) = MockDisplay::new(&context)?;
///
///     display.write_text(" 042").await?;
///     assert_eq!(handle.shown(), Some(" 042".to_string()));
///
///     display.clear().await?;
///     assert_eq!(handle.shown(), None);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockDisplay {
    state: Arc<Mutex<DisplayState>>,
    name: String,
}

impl MockDisplay {
    /// Create a mock display on the default bus.
    ///
    /// # Errors
    ///
    /// Returns an error if another device already owns the mock display bus.
    pub fn new(context: &HardwareContext) -> Result<(Self, MockDisplayHandle)> {
        Self::with_name(context, "Mock Display".to_string())
    }

    /// Create a mock display with a custom name.
    pub fn with_name(
        context: &HardwareContext,
        name: String,
    ) -> Result<(Self, MockDisplayHandle)> {
        context.claim(Resource::Bus("mock-display".into()), name.clone())?;

        let state = Arc::new(Mutex::new(DisplayState::default()));

        let hook_state = Arc::clone(&state);
        context.on_release(move || {
            let mut state = hook_state.lock().unwrap_or_else(|e| e.into_inner());
            state.released += 1;
        });

        let display = Self {
            state: Arc::clone(&state),
            name,
        };
        Ok((display, MockDisplayHandle { state }))
    }

    fn record(&self, text: Option<String>) -> Result<()> {
        let mut state = lock(&self.state);
        check_writable(&state, &self.name)?;
        state.frames.push(DisplayFrame {
            text,
            at: Instant::now(),
        });
        Ok(())
    }
}

impl SegmentDisplay for MockDisplay {
    async fn write_text(&mut self, text: &str) -> Result<()> {
        self.record(Some(text.to_string()))
    }

    async fn clear(&mut self) -> Result<()> {
        self.record(None)
    }

    async fn set_brightness(&mut self, level: u8) -> Result<()> {
        if level > 15 {
            return Err(HardwareError::invalid_data(format!(
                "Brightness must be 0-15, got {level}"
            )));
        }
        let mut state = lock(&self.state);
        check_writable(&state, &self.name)?;
        state.brightness = Some(level);
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Segment Display v1.0")
            .with_firmware_version("1.0.0"))
    }
}

/// Handle for inspecting and controlling a mock display.
#[derive(Debug, Clone)]
pub struct MockDisplayHandle {
    state: Arc<Mutex<DisplayState>>,
}

impl MockDisplayHandle {
    /// Every update applied so far, oldest first.
    pub fn frames(&self) -> Vec<DisplayFrame> {
        lock(&self.state).frames.clone()
    }

    /// Frame texts only, oldest first.
    pub fn texts(&self) -> Vec<Option<String>> {
        lock(&self.state)
            .frames
            .iter()
            .map(|f| f.text.clone())
            .collect()
    }

    /// What the display currently shows (`None` when blank).
    pub fn shown(&self) -> Option<String> {
        lock(&self.state)
            .frames
            .last()
            .and_then(|f| f.text.clone())
    }

    pub fn brightness(&self) -> Option<u8> {
        lock(&self.state).brightness
    }

    /// How many times the hardware context released this display.
    pub fn release_count(&self) -> usize {
        lock(&self.state).released
    }

    /// Make subsequent writes fail with a communication error.
    pub fn set_fail_writes(&self, fail: bool) {
        lock(&self.state).fail_writes = fail;
    }
}

fn lock(state: &Mutex<DisplayState>) -> MutexGuard<'_, DisplayState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

fn check_writable(state: &DisplayState, name: &str) -> Result<()> {
    if state.released > 0 {
        return Err(HardwareError::released(name));
    }
    if state.fail_writes {
        return Err(HardwareError::communication("injected display failure"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_display_records_frames() {
        let context = HardwareContext::new();
        let (mut display, handle) = MockDisplay::new(&context).unwrap();

        display.write_text(" 005").await.unwrap();
        display.clear().await.unwrap();
        display.write_text(" 005").await.unwrap();

        assert_eq!(
            handle.texts(),
            vec![Some(" 005".to_string()), None, Some(" 005".to_string())]
        );
        assert_eq!(handle.shown(), Some(" 005".to_string()));
    }

    #[tokio::test]
    async fn test_mock_display_brightness() {
        let context = HardwareContext::new();
        let (mut display, handle) = MockDisplay::new(&context).unwrap();

        assert_eq!(handle.brightness(), None);
        display.set_brightness(7).await.unwrap();
        assert_eq!(handle.brightness(), Some(7));
        assert!(display.set_brightness(16).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_display_get_info() {
        let context = HardwareContext::new();
        let (display, _handle) = MockDisplay::with_name(&context, "Front".to_string()).unwrap();

        let info = display.get_info().await.unwrap();
        assert_eq!(info.name, "Front");
        assert_eq!(info.model, "Mock Segment Display v1.0");
    }

    #[tokio::test]
    async fn test_mock_display_injected_failure() {
        let context = HardwareContext::new();
        let (mut display, handle) = MockDisplay::new(&context).unwrap();

        handle.set_fail_writes(true);
        let err = display.write_text(" 001").await.unwrap_err();
        assert!(matches!(err, HardwareError::CommunicationError { .. }));
        assert!(handle.frames().is_empty());
    }

    #[tokio::test]
    async fn test_mock_display_released_once() {
        let context = HardwareContext::new();
        let (mut display, handle) = MockDisplay::new(&context).unwrap();

        context.release();
        context.release();

        assert_eq!(handle.release_count(), 1);
        assert!(matches!(
            display.clear().await,
            Err(HardwareError::Released { .. })
        ));
    }

    #[test]
    fn test_second_display_conflicts() {
        let context = HardwareContext::new();
        let _first = MockDisplay::new(&context).unwrap();
        assert!(MockDisplay::new(&context).is_err());
    }
}
