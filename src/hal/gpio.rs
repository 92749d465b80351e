//! Relay output through the libgpiod `gpioset` tool.
//!
//! Each write runs `gpioset <chip> <pin>=<value> <pin>=<value>` for the two
//! pins of one channel. The child is polled until it exits and is killed
//! once it overruns the write timeout.

use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::{RelayConfig, ShortString};
use crate::traits::{Direction, RelayOutput};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Failure to drive a relay channel.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// `gpioset` could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that was run.
        program: &'static str,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// `gpioset` ran but reported failure.
    #[error("gpioset exited with {0}")]
    Exit(ExitStatus),
    /// `gpioset` did not finish in time and was killed.
    #[error("gpioset did not finish within {0:?}")]
    Timeout(Duration),
}

/// Two-pin-per-channel relay board driven by `gpioset`.
#[derive(Clone, Debug)]
pub struct GpioSetRelay {
    program: &'static str,
    chip: ShortString,
    up_pins: [u32; 2],
    down_pins: [u32; 2],
    timeout: Duration,
}

impl GpioSetRelay {
    /// Relay board as described by `config`.
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            program: "gpioset",
            chip: config.chip.clone(),
            up_pins: config.up_pins,
            down_pins: config.down_pins,
            timeout: Duration::from_millis(u64::from(config.write_timeout_ms)),
        }
    }

    /// Run a different executable with the same arguments.
    pub fn with_program(mut self, program: &'static str) -> Self {
        self.program = program;
        self
    }

    /// Pins driven by `channel`.
    pub fn pins(&self, channel: Direction) -> [u32; 2] {
        match channel {
            Direction::Up => self.up_pins,
            Direction::Down => self.down_pins,
        }
    }

    /// Arguments passed to `gpioset` for one write.
    pub fn args(&self, channel: Direction, energized: bool) -> Vec<String> {
        let value = u8::from(energized);
        let mut args = vec![self.chip.to_string()];
        args.extend(self.pins(channel).iter().map(|pin| format!("{pin}={value}")));
        args
    }

    /// Release both channels without tracking state.
    ///
    /// Used once at startup, before the board is handed to the controller.
    pub fn release_both(&mut self) -> Result<(), RelayError> {
        let up = self.set(Direction::Up, false);
        let down = self.set(Direction::Down, false);
        up.and(down)
    }

    fn wait_bounded(&self, mut child: Child) -> Result<ExitStatus, RelayError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RelayError::Timeout(self.timeout));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    let _ = child.kill();
                    return Err(RelayError::Spawn {
                        program: self.program,
                        source,
                    });
                }
            }
        }
    }
}

impl Default for GpioSetRelay {
    fn default() -> Self {
        Self::from_config(&RelayConfig::default())
    }
}

impl RelayOutput for GpioSetRelay {
    type Error = RelayError;

    fn set(&mut self, channel: Direction, energized: bool) -> Result<(), Self::Error> {
        let child = Command::new(self.program)
            .args(self.args(channel, energized))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| RelayError::Spawn {
                program: self.program,
                source,
            })?;

        let status = self.wait_bounded(child)?;
        if status.success() {
            Ok(())
        } else {
            Err(RelayError::Exit(status))
        }
    }
}
