//! # rs-lift
//!
//! Motion and position control for a four-level lift (B, G, 1, 2) driven by
//! two direction relays and one presence sensor per level.
//!
//! ## Features
//!
//! - **Closed-loop trips**: request a level, the controller picks a direction
//!   and stops when that level's sensor reports the cab
//! - **Manual drive** with terminal-level guards
//! - **Relay interlock**: the two direction relays are never on together
//! - **Heartbeat watchdog**: stops a moving lift when the panel goes quiet
//! - **Simulation**: a virtual plant replaces the sensors for bench testing
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Relay, presence feed, and clock abstractions
//! - `level` - Levels, heights, and the `At` / `Between` position model
//! - `sensor` - Sensor line decoding
//! - `position` - Position tracking from presence events
//! - `relay` - Edge-triggered, interlocked relay actuation
//! - `controller` - Main controller that ties everything together
//! - `safety` - Heartbeat watchdog
//! - `simulation` - Virtual lift plant
//! - `hal` - Concrete implementations (mocks, `gpioset` relays, serial feed)
//! - `services` - HTTP API and runtime loops (`web` feature)
//!
//! ## Example
//!
//! ```rust
//! use rs_lift::{CommandOutcome, Direction, Level, LiftCommand, LiftController, LiftState};
//! use rs_lift::hal::{MockFeed, MockRelay};
//!
//! let feed = MockFeed::new();
//! let mut lift = LiftController::new(MockRelay::new(), feed.clone());
//!
//! // The sensor node reports the cab at ground level
//! feed.push_line("G : LIFT HERE\r\n");
//! lift.update(0).unwrap();
//!
//! // Ask for level 2
//! let outcome = lift.apply_command(LiftCommand::RequestFloor(Level::Second), 10).unwrap();
//! assert_eq!(outcome, CommandOutcome::Moving(Direction::Up));
//!
//! // Update in your main loop until the sensor at level 2 fires
//! feed.push_line("G : LIFT AWAY");
//! feed.push_line("1 : LIFT HERE");
//! feed.push_line("1 : LIFT AWAY");
//! feed.push_line("2 : LIFT HERE");
//! lift.update(20).unwrap();
//! assert_eq!(lift.state(), LiftState::Idle);
//! ```

#![warn(missing_docs)]

/// Commands, outcomes, and errors for the lift controller.
pub mod commands;
/// Configuration with builder-style setters and TOML loading.
pub mod config;
/// Main lift controller.
pub mod controller;
/// Transient panel messages.
pub mod display;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Levels and positions.
pub mod level;
/// Position tracking from presence events.
pub mod position;
/// Relay actuation with interlock.
pub mod relay;
/// Heartbeat watchdog.
pub mod safety;
/// Sensor line decoding.
pub mod sensor;
/// Virtual lift plant.
pub mod simulation;
/// Status snapshots.
pub mod status;
/// Core traits for hardware abstraction.
pub mod traits;

/// Request bodies for the HTTP API (serde-based).
#[cfg(feature = "serde")]
pub mod messages;

/// HTTP API, sensor readers, and runtime loops (feature-gated).
#[cfg(feature = "web")]
pub mod services;

// Re-exports for convenience
pub use commands::{CommandOutcome, ControlError, LiftCommand};
pub use controller::{LiftController, LiftState, MSG_CONNECTION_LOST, MSG_STOP};
pub use display::DisplayMessage;
pub use level::{InvalidLevel, Level, Position, LEVEL_COUNT};
pub use position::PositionTracker;
pub use relay::{RelayActuator, RelayPair, WriteFailure};
pub use safety::SafetyWatchdog;
pub use sensor::{DecodeError, LevelPresence};
pub use simulation::SimulationEngine;
pub use status::LiftStatus;
pub use traits::{Clock, Direction, PresenceFeed, RelayOutput, SystemClock};

// Config re-exports
pub use config::{
    Config, ControllerConfig, RelayConfig, SafetyConfig, SensorConfig, SensorMode,
    SimulationConfig, WebConfig,
};

// Message re-exports (for the HTTP API)
#[cfg(feature = "serde")]
pub use messages::{ControlRequest, FloorRequest};
