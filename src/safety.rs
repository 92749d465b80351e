//! Heartbeat watchdog.
//!
//! The control panel sends a heartbeat while it is open. If the panel goes
//! quiet for longer than the inactivity threshold while either relay is
//! energized, the watchdog stops the lift. An idle lift is never touched, so
//! a closed panel on a parked lift produces no relay traffic.

use crate::commands::ControlError;
use crate::config::SafetyConfig;
use crate::controller::LiftController;
use crate::traits::RelayOutput;

/// Tracks the last heartbeat and stops the lift when it goes stale.
///
/// # Example
///
/// ```rust
/// use rs_lift::{Direction, LiftController, SafetyWatchdog};
/// use rs_lift::hal::{MockFeed, MockRelay};
///
/// let mut lift = LiftController::new(MockRelay::new(), MockFeed::new());
/// let mut watchdog = SafetyWatchdog::new(2000, 0);
///
/// lift.set_manual(Direction::Up, true, 0).unwrap();
/// assert!(!watchdog.check(&mut lift, 1500).unwrap());
/// assert!(watchdog.check(&mut lift, 2500).unwrap());
/// assert!(!lift.is_energized());
/// ```
#[derive(Clone, Debug)]
pub struct SafetyWatchdog {
    threshold_ms: u64,
    last_heartbeat_ms: u64,
    trips: u32,
}

impl SafetyWatchdog {
    /// Create a watchdog that counts `now_ms` as the first heartbeat.
    pub fn new(threshold_ms: u64, now_ms: u64) -> Self {
        Self {
            threshold_ms,
            last_heartbeat_ms: now_ms,
            trips: 0,
        }
    }

    /// Create a watchdog from configuration.
    pub fn from_config(config: &SafetyConfig, now_ms: u64) -> Self {
        Self::new(u64::from(config.inactivity_threshold_ms), now_ms)
    }

    /// Record a heartbeat from the panel.
    pub fn heartbeat(&mut self, now_ms: u64) {
        self.last_heartbeat_ms = self.last_heartbeat_ms.max(now_ms);
    }

    /// Time since the last heartbeat.
    pub fn silence_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_heartbeat_ms)
    }

    /// True once the silence exceeds the threshold.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.silence_ms(now_ms) > self.threshold_ms
    }

    /// Number of times the watchdog has stopped the lift.
    pub fn trips(&self) -> u32 {
        self.trips
    }

    /// Run one check.
    ///
    /// Stops the lift if the heartbeat is stale and a relay is energized.
    /// Returns `true` when a stop was issued. A failed stop is returned as
    /// an error; the next check retries since the relay is still on.
    pub fn check<R: RelayOutput>(
        &mut self,
        lift: &mut LiftController<R>,
        now_ms: u64,
    ) -> Result<bool, ControlError<R::Error>> {
        if !self.is_expired(now_ms) || !lift.is_energized() {
            return Ok(false);
        }
        tracing::warn!(
            silence_ms = self.silence_ms(now_ms),
            threshold_ms = self.threshold_ms,
            "heartbeat lost, stopping lift"
        );
        self.trips += 1;
        lift.watchdog_stop(now_ms)?;
        Ok(true)
    }
}
