//! Main lift controller that ties everything together.
//!
//! This module provides [`LiftController`], the single owner of the lift's
//! motion state: the relay pair, the target level, and the
//! Idle / Going Up / Going Down state machine.
//!
//! # Overview
//!
//! The controller:
//! - Accepts floor requests, manual drive, and stops
//! - Picks a travel direction from the best-known position
//! - Closes the loop on presence events, stopping at the target level and
//!   always at a terminal level
//! - Forwards every motion change to its [`PresenceFeed`], which is how the
//!   simulator knows where to move
//! - Provides [`LiftStatus`] snapshots for the panel
//!
//! ```text
//! Idle --request_floor / set_manual(engage)--> GoingUp | GoingDown
//! GoingUp | GoingDown --arrival at target or terminal / stop--> Idle
//! ```
//!
//! # Example
//!
//! ```rust
//! use rs_lift::{Level, LiftController, LiftState, Position};
//! use rs_lift::hal::{MockFeed, MockRelay};
//!
//! let mut lift = LiftController::new(MockRelay::new(), MockFeed::new());
//! lift.ingest_line("G : LIFT HERE", 0).unwrap();
//!
//! lift.request_floor(Level::First, 10).unwrap();
//! assert_eq!(lift.state(), LiftState::GoingUp);
//!
//! lift.ingest_line("G : LIFT AWAY", 500).unwrap();
//! lift.ingest_line("1 : LIFT HERE", 3000).unwrap();
//!
//! assert_eq!(lift.state(), LiftState::Idle);
//! assert_eq!(lift.position(), Some(Position::At(Level::First)));
//! assert_eq!(lift.target(), None);
//! ```
//!
//! # Thread Safety
//!
//! The controller is not thread-safe by itself. Every mutating operation
//! takes `&mut self`; share it through
//! [`SharedLiftState`](crate::services::SharedLiftState) (requires `web`)
//! or another single lock so commands, sensor events and the watchdog are
//! serialized.

use crate::commands::{CommandOutcome, ControlError, LiftCommand};
use crate::config::{truncated, ControllerConfig};
use crate::display::DisplayMessage;
use crate::level::{Level, Position};
use crate::position::PositionTracker;
use crate::relay::{RelayActuator, RelayPair};
use crate::sensor::{self, LevelPresence};
use crate::status::LiftStatus;
use crate::traits::{Direction, PresenceFeed, RelayOutput};

/// Logical motion state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LiftState {
    /// Not moving.
    #[default]
    Idle,
    /// Driving the "up" relay.
    GoingUp,
    /// Driving the "down" relay.
    GoingDown,
}

impl LiftState {
    /// State for a driven direction.
    pub const fn moving(direction: Direction) -> Self {
        match direction {
            Direction::Up => LiftState::GoingUp,
            Direction::Down => LiftState::GoingDown,
        }
    }

    /// State implied by a relay pair.
    pub const fn from_relays(relays: RelayPair) -> Self {
        match relays.direction() {
            Some(direction) => Self::moving(direction),
            None => LiftState::Idle,
        }
    }

    /// Direction of travel, `None` when idle.
    pub const fn direction(&self) -> Option<Direction> {
        match self {
            LiftState::Idle => None,
            LiftState::GoingUp => Some(Direction::Up),
            LiftState::GoingDown => Some(Direction::Down),
        }
    }

    /// Panel label shown when no transient message is active.
    pub const fn label(&self) -> &'static str {
        match self {
            LiftState::Idle => "Idle",
            LiftState::GoingUp => "Going Up",
            LiftState::GoingDown => "Going Down",
        }
    }
}

/// Display text shown after an emergency stop.
pub const MSG_STOP: &str = "Emergency STOP";

/// Display text shown after the watchdog stops the lift.
pub const MSG_CONNECTION_LOST: &str = "Connection lost";

/// Main lift controller.
///
/// # Type Parameter
///
/// - `R`: the relay backend ([`RelayOutput`] trait)
pub struct LiftController<R: RelayOutput> {
    relays: RelayActuator<R>,
    tracker: PositionTracker,
    feed: Box<dyn PresenceFeed + Send>,
    state: LiftState,
    target: Option<Level>,
    message: DisplayMessage,
}

impl<R: RelayOutput> LiftController<R> {
    /// Create a controller with default settings.
    pub fn new(output: R, feed: impl PresenceFeed + Send + 'static) -> Self {
        Self::with_config(output, feed, &ControllerConfig::default())
    }

    /// Create a controller from configuration.
    pub fn with_config(
        output: R,
        feed: impl PresenceFeed + Send + 'static,
        config: &ControllerConfig,
    ) -> Self {
        Self {
            relays: RelayActuator::new(output),
            tracker: PositionTracker::new(),
            feed: Box::new(feed),
            state: LiftState::Idle,
            target: None,
            message: DisplayMessage::new(u64::from(config.message_revert_ms)),
        }
    }

    /// Apply a command.
    pub fn apply_command(
        &mut self,
        cmd: LiftCommand,
        now_ms: u64,
    ) -> Result<CommandOutcome, ControlError<R::Error>> {
        tracing::info!(command = cmd.name(), ?cmd, "command received");
        match cmd {
            LiftCommand::RequestFloor(level) => self.request_floor(level, now_ms),
            LiftCommand::Manual { direction, engage } => self.set_manual(direction, engage, now_ms),
            LiftCommand::Stop => self.stop(now_ms),
        }
    }

    /// Start an automatic trip to `target`.
    ///
    /// When the cab is already confirmed at `target` nothing moves: an idle
    /// lift reports [`CommandOutcome::AlreadyAtLevel`], a moving one stops
    /// there. Otherwise the direction follows the height estimate.
    pub fn request_floor(
        &mut self,
        target: Level,
        now_ms: u64,
    ) -> Result<CommandOutcome, ControlError<R::Error>> {
        if self.tracker.is_confirmed_at(target) {
            if self.state == LiftState::Idle {
                self.target = None;
                return Ok(CommandOutcome::AlreadyAtLevel(target));
            }
            self.target = Some(target);
            self.complete_trip(target, now_ms)?;
            return Ok(CommandOutcome::Arrived(target));
        }

        let from_m = self
            .tracker
            .height_estimate_m()
            .ok_or(ControlError::PositionUnknown)?;
        let Some(direction) = Direction::towards(from_m, target.height_m()) else {
            self.target = None;
            return Ok(CommandOutcome::AlreadyAtLevel(target));
        };

        self.engage(direction, now_ms)?;
        self.target = Some(target);
        self.state = LiftState::moving(direction);
        self.feed.set_motion(Some(direction), now_ms);
        self.message.set(&format!("Level {target} requested"), now_ms);
        tracing::info!(%target, %direction, from_m, "trip started");

        Ok(CommandOutcome::Moving(direction))
    }

    /// Drive `direction` by hand (`engage = true`) or release it.
    ///
    /// Cancels any automatic trip. Engaging towards a terminal level the cab
    /// is already at is downgraded to a release.
    pub fn set_manual(
        &mut self,
        direction: Direction,
        engage: bool,
        now_ms: u64,
    ) -> Result<CommandOutcome, ControlError<R::Error>> {
        let guarded = engage && self.at_limit(direction);
        if guarded {
            tracing::info!(%direction, "already at terminal level, ignoring manual drive");
        }

        if engage && !guarded {
            self.engage(direction, now_ms)?;
            self.target = None;
            self.state = LiftState::moving(direction);
            self.feed.set_motion(Some(direction), now_ms);
            self.message.set(
                match direction {
                    Direction::Up => "Manual up",
                    Direction::Down => "Manual down",
                },
                now_ms,
            );
            return Ok(CommandOutcome::Moving(direction));
        }

        self.relays.release_all()?;
        self.target = None;
        self.come_to_rest(now_ms);
        self.message.clear();

        if guarded {
            Ok(CommandOutcome::Guarded(direction))
        } else {
            Ok(CommandOutcome::Stopped)
        }
    }

    /// Emergency stop. Idempotent.
    ///
    /// The target is cleared even if a relay release fails, so no later
    /// sensor event can resume the cancelled trip.
    pub fn stop(&mut self, now_ms: u64) -> Result<CommandOutcome, ControlError<R::Error>> {
        self.halt(MSG_STOP, now_ms)
    }

    /// Stop issued by the safety watchdog.
    pub fn watchdog_stop(&mut self, now_ms: u64) -> Result<CommandOutcome, ControlError<R::Error>> {
        self.halt(MSG_CONNECTION_LOST, now_ms)
    }

    /// Handle a confirmed arrival at `level`.
    ///
    /// Completes the trip when `level` is the target or a terminal level.
    /// Returns `true` if the lift was brought to rest.
    pub fn on_arrival(&mut self, level: Level, now_ms: u64) -> Result<bool, ControlError<R::Error>> {
        if self.target == Some(level) || level.is_terminal() {
            self.complete_trip(level, now_ms)?;
            Ok(true)
        } else {
            tracing::debug!(%level, target = ?self.target, "passing level");
            Ok(false)
        }
    }

    /// Feed one decoded presence event through the tracker.
    ///
    /// Returns the level when the event was an arrival.
    pub fn on_presence(
        &mut self,
        event: LevelPresence,
        now_ms: u64,
    ) -> Result<Option<Level>, ControlError<R::Error>> {
        let moving = self.relays.state().direction();
        match self.tracker.on_event(event, moving) {
            Some(level) => {
                self.on_arrival(level, now_ms)?;
                Ok(Some(level))
            }
            None => Ok(None),
        }
    }

    /// Decode and apply one raw sensor line; malformed lines are logged and dropped.
    pub fn ingest_line(
        &mut self,
        raw: &str,
        now_ms: u64,
    ) -> Result<Option<Level>, ControlError<R::Error>> {
        match sensor::decode(raw) {
            Some(event) => self.on_presence(event, now_ms),
            None => Ok(None),
        }
    }

    /// Poll the presence feed and apply its events in order.
    ///
    /// Call this every tick (e.g., 20ms). All events are applied even if one
    /// of them fails; the first failure is returned.
    pub fn update(&mut self, now_ms: u64) -> Result<(), ControlError<R::Error>> {
        let mut first_err = None;
        for event in self.feed.poll(now_ms) {
            if let Err(err) = self.on_presence(event, now_ms) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Snapshot for the status endpoint.
    pub fn status(&self, now_ms: u64) -> LiftStatus {
        let relays = self.relays.state();
        LiftStatus {
            relay_up: relays.up,
            relay_down: relays.down,
            position: self.tracker.position(),
            target: self.target,
            state: self.state,
            display_message: truncated(self.message.current(now_ms, self.state.label())),
            simulated: self.feed.is_simulated(),
        }
    }

    /// Current motion state.
    pub fn state(&self) -> LiftState {
        self.state
    }

    /// Level of the automatic trip in progress.
    pub fn target(&self) -> Option<Level> {
        self.target
    }

    /// Best-known position.
    pub fn position(&self) -> Option<Position> {
        self.tracker.position()
    }

    /// Relay pair state.
    pub fn relays(&self) -> RelayPair {
        self.relays.state()
    }

    /// True if either relay is energized.
    pub fn is_energized(&self) -> bool {
        self.relays.state().any()
    }

    /// The position tracker.
    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    /// The relay backend.
    pub fn relay_output(&self) -> &R {
        self.relays.output()
    }

    /// Mutable access to the relay backend.
    pub fn relay_output_mut(&mut self) -> &mut R {
        self.relays.output_mut()
    }

    /// True when the feed is the simulator.
    pub fn is_simulated(&self) -> bool {
        self.feed.is_simulated()
    }

    fn at_limit(&self, direction: Direction) -> bool {
        self.tracker.position() == Some(Position::At(Level::limit(direction)))
    }

    fn complete_trip(&mut self, level: Level, now_ms: u64) -> Result<(), ControlError<R::Error>> {
        let was_active = self.state != LiftState::Idle || self.target.is_some();
        self.relays.release_all()?;
        self.target = None;
        self.come_to_rest(now_ms);
        if was_active {
            self.message.set(&format!("Level {level} Reached"), now_ms);
            tracing::info!(%level, "lift reached level");
        }
        Ok(())
    }

    fn halt(&mut self, text: &str, now_ms: u64) -> Result<CommandOutcome, ControlError<R::Error>> {
        let released = self.relays.release_all();
        self.target = None;
        self.follow_relays(now_ms);
        self.message.set(text, now_ms);
        released?;
        Ok(CommandOutcome::Stopped)
    }

    /// Energize `direction`. On failure the motion state is brought back in
    /// line with whatever the relays were left at.
    fn engage(&mut self, direction: Direction, now_ms: u64) -> Result<(), ControlError<R::Error>> {
        if let Err(failure) = self.relays.engage(direction) {
            tracing::error!(%direction, "relay engage failed");
            self.follow_relays(now_ms);
            return Err(failure.into());
        }
        Ok(())
    }

    /// Derive the motion state from the relays' last written state.
    ///
    /// With both relays off the trip is cancelled and the lift comes to rest.
    fn follow_relays(&mut self, now_ms: u64) {
        let relays = self.relays.state();
        match relays.direction() {
            Some(direction) => {
                self.state = LiftState::moving(direction);
                self.feed.set_motion(Some(direction), now_ms);
            }
            None => {
                self.target = None;
                self.come_to_rest(now_ms);
            }
        }
    }

    fn come_to_rest(&mut self, now_ms: u64) {
        self.state = LiftState::Idle;
        self.feed.set_motion(None, now_ms);
        self.tracker.settle();
    }
}
