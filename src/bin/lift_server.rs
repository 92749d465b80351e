//! Lift control server.
//!
//! Drives the relay board, reads the level sensors (or simulates them), and
//! serves the control panel API.
//!
//! # Usage
//!
//! ```sh
//! lift_server --config /etc/rs-lift/lift.toml
//! lift_server --simulate --mock-relays --port 8080
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rs_lift::hal::{GpioSetRelay, LineFeed, MockRelay};
use rs_lift::services::{
    run_server_with_state, shutdown_signal, spawn_sensor_readers, spawn_update_loop,
    spawn_watchdog_loop, stop_for_shutdown, FeedSource, SharedLiftState, WebServerConfig,
};
use rs_lift::{Config, LiftController, PresenceFeed, RelayOutput, SensorMode, SimulationEngine};

/// Four-level lift controller with a web control panel
#[derive(Parser, Debug)]
#[command(name = "lift_server")]
#[command(version)]
#[command(about = "Lift motion and position control server")]
struct Args {
    /// TOML configuration file; defaults are used when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// HTTP port (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Use the virtual plant instead of the sensor ports
    #[arg(short = 's', long)]
    simulate: bool,

    /// Record relay writes in memory instead of driving GPIO
    #[arg(long)]
    mock_relays: bool,

    /// Log filter, e.g. `debug` or `rs_lift=trace` (overrides RUST_LOG)
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_tracing(args.log_level.as_deref())?;

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(port) = args.port {
        config.web.port = port;
    }
    if args.simulate {
        config.sensors.mode = SensorMode::Simulated;
    }

    let source = FeedSource::select(&config.sensors);
    tracing::info!(simulated = source.is_simulated(), "presence feed selected");

    if args.mock_relays {
        tracing::warn!("relay writes are not reaching hardware");
        serve(MockRelay::new(), source, config).await
    } else {
        let mut relays = GpioSetRelay::from_config(&config.relays);
        if let Err(err) = relays.release_both() {
            tracing::warn!(error = %err, "could not release relays at startup");
        }
        serve(relays, source, config).await
    }
}

async fn serve<R>(output: R, source: FeedSource, config: Config) -> anyhow::Result<()>
where
    R: RelayOutput + Send + 'static,
    R::Error: Send + 'static,
{
    let mut readers = Vec::new();
    let feed: Box<dyn PresenceFeed + Send> = match &source {
        FeedSource::Simulated => Box::new(SimulationEngine::from_config(&config.simulation)),
        FeedSource::Sensors(ports) => {
            let (feed, lines) = LineFeed::channel();
            readers = spawn_sensor_readers(ports, config.sensors.baud_rate, &lines);
            Box::new(feed)
        }
    };

    let controller = LiftController::with_config(output, feed, &config.controller);
    let state = Arc::new(SharedLiftState::new(controller, &config.safety));

    let update = spawn_update_loop(Arc::clone(&state), config.controller.update_interval_ms);
    let watchdog = spawn_watchdog_loop(Arc::clone(&state), config.safety.check_interval_ms);

    let web_config = WebServerConfig::from_config(&config.web);
    let served = run_server_with_state(Arc::clone(&state), web_config, shutdown_signal()).await;

    update.abort();
    watchdog.abort();
    for reader in readers {
        reader.abort();
    }
    stop_for_shutdown(&state).await;

    served.context("web server failed")
}

fn setup_tracing(filter: Option<&str>) -> anyhow::Result<()> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter {directives:?}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
