//! Command types, outcomes, and errors for the lift controller.
//!
//! Commands arrive from the transport layer (HTTP, CLI, tests) already
//! authenticated. Each maps onto one [`LiftController`] operation:
//!
//! | Command | Operation |
//! |---------|-----------|
//! | [`LiftCommand::RequestFloor`] | [`LiftController::request_floor`] |
//! | [`LiftCommand::Manual`] | [`LiftController::set_manual`] |
//! | [`LiftCommand::Stop`] | [`LiftController::stop`] |
//!
//! # Example
//!
//! ```rust
//! use rs_lift::{CommandOutcome, Direction, Level, LiftCommand, LiftController};
//! use rs_lift::hal::{MockFeed, MockRelay};
//! use rs_lift::sensor::LevelPresence;
//!
//! let mut lift = LiftController::new(MockRelay::new(), MockFeed::new());
//! lift.on_presence(LevelPresence::new(Level::Ground, true), 0).unwrap();
//!
//! let outcome = lift.apply_command(LiftCommand::RequestFloor(Level::Second), 10).unwrap();
//! assert_eq!(outcome, CommandOutcome::Moving(Direction::Up));
//! ```
//!
//! [`LiftController`]: crate::LiftController
//! [`LiftController::request_floor`]: crate::LiftController::request_floor
//! [`LiftController::set_manual`]: crate::LiftController::set_manual
//! [`LiftController::stop`]: crate::LiftController::stop

use crate::level::{InvalidLevel, Level};
use crate::relay::WriteFailure;
use crate::traits::Direction;

/// A command for the lift.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiftCommand {
    /// Travel to a level automatically.
    RequestFloor(Level),
    /// Drive a direction by hand, or release it.
    Manual {
        /// Direction to drive.
        direction: Direction,
        /// `true` to drive, `false` to release.
        engage: bool,
    },
    /// Emergency stop.
    Stop,
}

impl LiftCommand {
    /// Short name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            LiftCommand::RequestFloor(_) => "request_floor",
            LiftCommand::Manual { .. } => "manual",
            LiftCommand::Stop => "stop",
        }
    }
}

/// What an accepted command did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The lift is now travelling in this direction.
    Moving(Direction),
    /// The lift was already at the requested level; nothing moved.
    AlreadyAtLevel(Level),
    /// The request completed the trip immediately.
    Arrived(Level),
    /// Both relays are released.
    Stopped,
    /// The request would drive past a terminal level and was downgraded to a release.
    Guarded(Direction),
}

impl CommandOutcome {
    /// Short name for API responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CommandOutcome::Moving(Direction::Up) => "moving_up",
            CommandOutcome::Moving(Direction::Down) => "moving_down",
            CommandOutcome::AlreadyAtLevel(_) => "already_at_level",
            CommandOutcome::Arrived(_) => "arrived",
            CommandOutcome::Stopped => "stopped",
            CommandOutcome::Guarded(_) => "boundary_guard",
        }
    }
}

/// Why a command was not applied.
///
/// `E` is the relay backend's error type.
#[derive(Debug, thiserror::Error)]
pub enum ControlError<E> {
    /// The requested level does not exist. Nothing changed.
    #[error(transparent)]
    InvalidLevel(#[from] InvalidLevel),

    /// No presence report has been seen yet, so no direction can be chosen.
    #[error("lift position is not known yet")]
    PositionUnknown,

    /// A relay write failed. Lift state was not updated.
    #[error("relay {channel} write failed: {cause:?}")]
    Actuator {
        /// Channel being written.
        channel: Direction,
        /// Backend error.
        cause: E,
    },
}

impl<E> From<WriteFailure<E>> for ControlError<E> {
    fn from(failure: WriteFailure<E>) -> Self {
        ControlError::Actuator {
            channel: failure.channel,
            cause: failure.cause,
        }
    }
}

impl<E> ControlError<E> {
    /// True for relay failures.
    pub fn is_actuator(&self) -> bool {
        matches!(self, ControlError::Actuator { .. })
    }
}
