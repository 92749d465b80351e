//! Presence feed backed by serial sensor nodes.
//!
//! Reader tasks push raw lines into a channel; the controller drains it on
//! every update. Lines are decoded here, so anything a node prints besides
//! presence reports (startup banners, door and call-button messages) is
//! dropped before it reaches the tracker.

use std::fs::OpenOptions;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::sensor::{self, LevelPresence};
use crate::traits::{Direction, PresenceFeed};

/// Sending half handed to sensor reader tasks.
pub type LineSender = Sender<String>;

/// Feed that decodes lines from real sensor nodes.
///
/// # Example
///
/// ```rust
/// use rs_lift::hal::LineFeed;
/// use rs_lift::traits::PresenceFeed;
///
/// let (mut feed, tx) = LineFeed::channel();
/// tx.send("2 : LIFT HERE\r".to_string()).unwrap();
/// tx.send("Sensor node ready".to_string()).unwrap();
///
/// let events = feed.poll(0);
/// assert_eq!(events.len(), 1);
/// assert!(events[0].present);
/// ```
#[derive(Debug)]
pub struct LineFeed {
    lines: Receiver<String>,
    connected: bool,
}

impl LineFeed {
    /// Create a feed and the sender its readers write into.
    pub fn channel() -> (Self, LineSender) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                lines: rx,
                connected: true,
            },
            tx,
        )
    }

    /// False once every sender has been dropped.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl PresenceFeed for LineFeed {
    fn set_motion(&mut self, _motion: Option<Direction>, _now_ms: u64) {}

    fn poll(&mut self, _now_ms: u64) -> Vec<LevelPresence> {
        let mut events = Vec::new();
        loop {
            match self.lines.try_recv() {
                Ok(line) => events.extend(sensor::decode(&line)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.connected {
                        tracing::error!("all sensor readers stopped");
                        self.connected = false;
                    }
                    break;
                }
            }
        }
        events
    }
}

/// Ports from `candidates` that can be opened for reading.
pub fn detect_sensor_ports<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    candidates
        .into_iter()
        .filter(|path| match OpenOptions::new().read(true).open(path) {
            Ok(_) => {
                tracing::info!(port = %path, "sensor port available");
                true
            }
            Err(err) => {
                tracing::warn!(port = %path, error = %err, "sensor port unavailable");
                false
            }
        })
        .map(str::to_owned)
        .collect()
}

/// Put a serial device into raw mode at `baud` using `stty`.
pub fn configure_port(path: &Path, baud: u32) -> std::io::Result<()> {
    let status = Command::new("stty")
        .arg("-F")
        .arg(path)
        .args([baud.to_string().as_str(), "raw", "-echo"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("stty exited with {status}")))
    }
}
