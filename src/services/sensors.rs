//! Serial sensor reader tasks.
//!
//! One task per port reads CRLF-terminated lines and forwards them to the
//! [`LineFeed`](crate::hal::LineFeed) channel. A port that fails or closes
//! is reopened after a delay; the task ends only when the feed is gone.
//!
//! [`FeedSource::select`] decides at startup whether the sensors or the
//! virtual plant drive the controller.

use std::path::PathBuf;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use crate::config::{SensorConfig, SensorMode};
use crate::hal::{configure_port, detect_sensor_ports, LineSender};

/// Delay before reopening a port that failed or closed.
pub const REOPEN_DELAY: Duration = Duration::from_secs(2);

/// Spawn a reader task for each port.
pub fn spawn_sensor_readers(ports: &[String], baud: u32, lines: &LineSender) -> Vec<JoinHandle<()>> {
    ports
        .iter()
        .map(|port| tokio::spawn(read_port(PathBuf::from(port), baud, lines.clone())))
        .collect()
}

async fn read_port(path: PathBuf, baud: u32, lines: LineSender) {
    loop {
        let stty_path = path.clone();
        match tokio::task::spawn_blocking(move || configure_port(&stty_path, baud)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::warn!(port = %path.display(), baud, error = %err, "could not configure port");
            }
            Err(err) => tracing::warn!(port = %path.display(), error = %err, "stty task failed"),
        }

        match File::open(&path).await {
            Ok(file) => {
                tracing::info!(port = %path.display(), "sensor port opened");
                let mut reader = BufReader::new(file).lines();
                loop {
                    match reader.next_line().await {
                        Ok(Some(line)) => {
                            if lines.send(line).is_err() {
                                tracing::debug!(port = %path.display(), "feed closed, reader exiting");
                                return;
                            }
                        }
                        Ok(None) => {
                            tracing::warn!(port = %path.display(), "sensor port closed");
                            break;
                        }
                        Err(err) => {
                            tracing::warn!(port = %path.display(), error = %err, "sensor read failed");
                            break;
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(port = %path.display(), error = %err, "failed to open sensor port");
            }
        }

        tokio::time::sleep(REOPEN_DELAY).await;
    }
}

/// Where the controller's presence events come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedSource {
    /// Serial sensor nodes on these ports.
    Sensors(Vec<String>),
    /// The virtual plant.
    Simulated,
}

impl FeedSource {
    /// Pick the feed for `config`.
    ///
    /// In [`SensorMode::Auto`] every configured port is tried once; the
    /// virtual plant is used only when none of them opens.
    pub fn select(config: &SensorConfig) -> Self {
        let ports = config.ports.iter().map(|p| p.as_str());
        match config.mode {
            SensorMode::Simulated => FeedSource::Simulated,
            SensorMode::Hardware => FeedSource::Sensors(ports.map(str::to_owned).collect()),
            SensorMode::Auto => {
                let open = detect_sensor_ports(ports);
                if open.is_empty() {
                    tracing::warn!("no sensor port could be opened, running in simulation mode");
                    FeedSource::Simulated
                } else {
                    FeedSource::Sensors(open)
                }
            }
        }
    }

    /// True for the virtual plant.
    pub fn is_simulated(&self) -> bool {
        matches!(self, FeedSource::Simulated)
    }
}
