//! Console station backend.
//!
//! Stands in for the physical station when no GPIO hardware is attached:
//! display frames and lamp levels go to the log, and button presses are read
//! from lines on stdin.
//!
//! | Input | Effect |
//! |-------|--------|
//! | `s`, `start` | start button edge |
//! | `e`, `end` | end button edge |
//! | `q`, `quit` | shut the station down |

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use queuepost_hardware::{
    ButtonChannel, DeviceInfo, EdgeSignaller, HardwareContext, HardwareError, LampOutput,
    Resource, Result, SegmentDisplay,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const DISPLAY_BUS: &str = "console-display";

/// Segment display that logs every frame.
#[derive(Debug)]
pub struct ConsoleDisplay {
    released: Arc<AtomicBool>,
}

impl ConsoleDisplay {
    pub fn new(context: &HardwareContext) -> Result<Self> {
        context.claim(Resource::Bus(DISPLAY_BUS.to_string()), "segment display")?;

        let released = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&released);
        context.on_release(move || {
            flag.store(true, Ordering::Release);
            debug!("Console display closed");
        });

        Ok(Self { released })
    }

    fn check_open(&self) -> Result<()> {
        if self.released.load(Ordering::Acquire) {
            return Err(HardwareError::released("console display"));
        }
        Ok(())
    }
}

impl SegmentDisplay for ConsoleDisplay {
    async fn write_text(&mut self, text: &str) -> Result<()> {
        self.check_open()?;
        info!(target: "queuepost::display", "[{text}]");
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        self.check_open()?;
        info!(target: "queuepost::display", "[    ]");
        Ok(())
    }

    async fn set_brightness(&mut self, level: u8) -> Result<()> {
        self.check_open()?;
        if level > 15 {
            return Err(HardwareError::invalid_data(format!(
                "Brightness must be 0-15, got {level}"
            )));
        }
        debug!(level, "Display brightness set");
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("Console Display", "stdout"))
    }
}

/// Status lamp that logs every level change.
#[derive(Debug)]
pub struct ConsoleLamp {
    pin: u8,
    released: Arc<AtomicBool>,
}

impl ConsoleLamp {
    pub fn new(context: &HardwareContext, pin: u8) -> Result<Self> {
        context.claim(Resource::Pin(pin), "status lamp")?;

        let released = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&released);
        context.on_release(move || {
            flag.store(true, Ordering::Release);
            debug!(pin, "Console lamp closed");
        });

        Ok(Self { pin, released })
    }
}

impl LampOutput for ConsoleLamp {
    async fn set_level(&mut self, on: bool) -> Result<()> {
        if self.released.load(Ordering::Acquire) {
            return Err(HardwareError::released(format!("lamp on GPIO{}", self.pin)));
        }
        info!(target: "queuepost::lamp", pin = self.pin, "{}", if on { "ON" } else { "off" });
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(format!("Console Lamp GPIO{}", self.pin), "stdout"))
    }
}

/// A recognised console input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Press(ButtonChannel),
    Quit,
}

/// Parse one input line; unknown input yields `None`.
pub fn parse_command(line: &str) -> Option<ConsoleCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "start" => Some(ConsoleCommand::Press(ButtonChannel::Start)),
        "e" | "end" => Some(ConsoleCommand::Press(ButtonChannel::End)),
        "q" | "quit" => Some(ConsoleCommand::Quit),
        _ => None,
    }
}

/// Feed button edges from `input` on a dedicated thread.
///
/// The thread plays the role of the GPIO interrupt callback: it only calls
/// the signallers, which never block. It exits at end of input or on `quit`,
/// which also cancels `shutdown`.
pub fn spawn_button_reader<R>(
    input: R,
    start: EdgeSignaller,
    end: EdgeSignaller,
    shutdown: CancellationToken,
) -> std::io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("console-buttons".to_string())
        .spawn(move || {
            for line in input.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(error = %e, "Console input failed");
                        break;
                    }
                };

                match parse_command(&line) {
                    Some(ConsoleCommand::Press(channel)) => {
                        let signaller = match channel {
                            ButtonChannel::Start => &start,
                            ButtonChannel::End => &end,
                        };
                        if !signaller.signal() {
                            debug!(%channel, "Press ignored as bounce");
                        }
                    }
                    Some(ConsoleCommand::Quit) => {
                        info!("Quit requested from console");
                        shutdown.cancel();
                        break;
                    }
                    None if line.trim().is_empty() => {}
                    None => warn!(input = %line.trim(), "Unknown console input (s, e, q)"),
                }
            }
            debug!("Console input closed");
        })
}
