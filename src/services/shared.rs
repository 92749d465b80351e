//! Shared lift state for the server's tasks.
//!
//! `SharedLiftState` owns the single [`LiftController`] and the
//! [`SafetyWatchdog`]. HTTP handlers, the update loop, the watchdog loop and
//! the shutdown hook all go through it, so every relay write is serialized
//! under one lock.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rs_lift::config::SafetyConfig;
//! use rs_lift::hal::{MockFeed, MockRelay};
//! use rs_lift::services::SharedLiftState;
//! use rs_lift::{LiftCommand, LiftController};
//!
//! let lift = LiftController::new(MockRelay::new(), MockFeed::new());
//! let state = Arc::new(SharedLiftState::new(lift, &SafetyConfig::default()));
//!
//! // Handlers apply commands
//! state.apply_command(LiftCommand::Stop).unwrap();
//!
//! // and read snapshots
//! let status = state.status();
//! assert!(!status.relay_up && !status.relay_down);
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinError;

use crate::commands::{CommandOutcome, ControlError, LiftCommand};
use crate::config::SafetyConfig;
use crate::controller::LiftController;
use crate::safety::SafetyWatchdog;
use crate::status::LiftStatus;
use crate::traits::{Clock, RelayOutput, SystemClock};

/// Lift controller and watchdog behind one time base.
///
/// # Thread Safety
///
/// - `Mutex` rather than `RwLock`: the 20ms update loop writes constantly.
/// - Poisoned locks are recovered, so a stop can still be issued after a
///   panic in another task.
/// - Only [`watchdog_tick`](Self::watchdog_tick) holds both locks, watchdog
///   first.
/// - Relay writes can block for the backend's write timeout. From async code,
///   call the locking methods through [`blocking`].
pub struct SharedLiftState<R: RelayOutput> {
    controller: Mutex<LiftController<R>>,
    watchdog: Mutex<SafetyWatchdog>,
    clock: Box<dyn Clock + Send + Sync>,
}

impl<R: RelayOutput> SharedLiftState<R> {
    /// Wrap a controller, timed by the system clock.
    pub fn new(controller: LiftController<R>, safety: &SafetyConfig) -> Self {
        Self::with_clock(controller, safety, SystemClock::new())
    }

    /// Wrap a controller with an explicit time source. Creation counts as the
    /// first heartbeat.
    pub fn with_clock(
        controller: LiftController<R>,
        safety: &SafetyConfig,
        clock: impl Clock + Send + Sync + 'static,
    ) -> Self {
        let now_ms = clock.now_ms();
        Self {
            controller: Mutex::new(controller),
            watchdog: Mutex::new(SafetyWatchdog::from_config(safety, now_ms)),
            clock: Box::new(clock),
        }
    }

    /// Current time from the injected clock.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Run `f` with the controller locked.
    ///
    /// The closure form keeps the lock from being held across an await.
    pub fn with_controller<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&mut LiftController<R>) -> T,
    {
        let mut guard = self.lock_controller();
        f(&mut *guard)
    }

    /// Current status snapshot.
    pub fn status(&self) -> LiftStatus {
        let now_ms = self.now_ms();
        self.lock_controller().status(now_ms)
    }

    /// Apply a command at the current time.
    pub fn apply_command(&self, cmd: LiftCommand) -> Result<CommandOutcome, ControlError<R::Error>> {
        let now_ms = self.now_ms();
        self.with_controller(|lift| lift.apply_command(cmd, now_ms))
    }

    /// Poll the presence feed once.
    pub fn update(&self) -> Result<(), ControlError<R::Error>> {
        let now_ms = self.now_ms();
        self.with_controller(|lift| lift.update(now_ms))
    }

    /// Record a heartbeat from the panel.
    pub fn heartbeat(&self) {
        let now_ms = self.now_ms();
        self.lock_watchdog().heartbeat(now_ms);
    }

    /// Run one watchdog check. Returns `true` if the lift was stopped.
    pub fn watchdog_tick(&self) -> Result<bool, ControlError<R::Error>> {
        let now_ms = self.now_ms();
        let mut watchdog = self.lock_watchdog();
        let mut lift = self.lock_controller();
        watchdog.check(&mut *lift, now_ms)
    }

    /// Number of watchdog stops so far.
    pub fn watchdog_trips(&self) -> u32 {
        self.lock_watchdog().trips()
    }

    fn lock_controller(&self) -> MutexGuard<'_, LiftController<R>> {
        self.controller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_watchdog(&self) -> MutexGuard<'_, SafetyWatchdog> {
        self.watchdog.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Run `f` against `state` on tokio's blocking pool.
///
/// Every lock holder may end up waiting on a relay write, so async tasks
/// never take the locks on a runtime worker.
pub async fn blocking<R, T, F>(state: &Arc<SharedLiftState<R>>, f: F) -> Result<T, JoinError>
where
    R: RelayOutput + Send + 'static,
    T: Send + 'static,
    F: FnOnce(&SharedLiftState<R>) -> T + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state)).await
}
