//! `queuepost` binary: runs one queue station against the console backend.

mod args;
mod console;
mod shutdown;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use queuepost_core::StationConfig;
use queuepost_hardware::{ButtonChannel, ButtonInput, HardwareContext};
use queuepost_network::{HttpQueueClient, HttpQueueClientConfig};
use queuepost_station::{ControllerTiming, DisplayDriver, JobController, StatusLamp};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::args::Args;
use crate::console::{ConsoleDisplay, ConsoleLamp};

type Station = JobController<HttpQueueClient, ConsoleDisplay, ConsoleLamp>;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    match run(args).await {
        Ok(()) => {
            info!("Station stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = args
        .load_config()
        .context("Failed to load configuration")?;

    info!(
        version = queuepost_core::VERSION,
        device_id = %config.device_id,
        server_url = %config.server_url,
        "Starting queue station"
    );

    let shutdown = shutdown::install_shutdown_handler()
        .context("Failed to install signal handlers")?;

    let context = HardwareContext::new();
    let controller = match build_station(&config, &context, &shutdown).await {
        Ok(controller) => controller,
        Err(e) => {
            context.release();
            return Err(e);
        }
    };

    info!("Station ready: type 's' + Enter for start, 'e' + Enter for end, 'q' to quit");
    let result = controller.run(&context, shutdown.clone()).await;
    shutdown.cancel();

    result.context("Station failed")
}

async fn build_station(
    config: &StationConfig,
    context: &HardwareContext,
    shutdown: &CancellationToken,
) -> Result<Station> {
    let queue = HttpQueueClient::new(HttpQueueClientConfig::from_station(config))
        .context("Failed to create queue client")?;

    let display = ConsoleDisplay::new(context).context("Failed to open display")?;
    let lamp = ConsoleLamp::new(context, config.lamp_pin).context("Failed to open lamp")?;
    let buttons = ButtonInput::new(
        context,
        config.start_button_pin,
        config.end_button_pin,
        config.bounce_window(),
    )
    .context("Failed to configure buttons")?;

    // detached: blocks on stdin until the process exits
    console::spawn_button_reader(
        io::BufReader::new(io::stdin()),
        buttons.signaller(ButtonChannel::Start),
        buttons.signaller(ButtonChannel::End),
        shutdown.clone(),
    )
    .context("Failed to start console input")?;

    let display = DisplayDriver::init(display, config.display_brightness)
        .await
        .context("Failed to initialize display")?;
    let lamp = StatusLamp::init(lamp)
        .await
        .context("Failed to initialize lamp")?;

    Ok(JobController::new(queue, display, lamp, buttons)
        .with_timing(ControllerTiming::from_config(config)))
}
