//! Request bodies accepted by the control panel endpoints.
//!
//! # Example
//!
//! ```
//! use rs_lift::messages::{ControlRequest, FloorRequest};
//! use rs_lift::{Direction, Level, LiftCommand};
//!
//! let req: FloorRequest = serde_json::from_str(r#"{"floor": "1"}"#).unwrap();
//! assert_eq!(req.command(), Ok(LiftCommand::RequestFloor(Level::First)));
//!
//! let req: ControlRequest = serde_json::from_str(r#"{"direction": "down", "state": true}"#).unwrap();
//! assert_eq!(
//!     req.command(),
//!     Some(LiftCommand::Manual { direction: Direction::Down, engage: true })
//! );
//! ```

use serde::{Deserialize, Serialize};

use crate::commands::LiftCommand;
use crate::level::{InvalidLevel, Level};
use crate::traits::Direction;

// ============================================================================
// Request Types
// ============================================================================

/// Request to travel to a level.
///
/// ```json
/// {"floor": "G"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorRequest {
    /// Level token: `B`, `G`, `1` or `2`.
    pub floor: String,
}

impl FloorRequest {
    /// Create a request for `level`.
    pub fn new(level: Level) -> Self {
        Self {
            floor: level.token().into(),
        }
    }

    /// The command this request asks for.
    pub fn command(&self) -> Result<LiftCommand, InvalidLevel> {
        Level::from_token(&self.floor).map(LiftCommand::RequestFloor)
    }
}

/// Request to drive or release one direction by hand.
///
/// ```json
/// {"direction": "up", "state": true}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    /// `"up"` or `"down"`.
    pub direction: String,
    /// `true` to drive, `false` to release.
    pub state: bool,
}

impl ControlRequest {
    /// The command this request asks for, `None` for an unknown direction.
    pub fn command(&self) -> Option<LiftCommand> {
        Direction::from_text(&self.direction).map(|direction| LiftCommand::Manual {
            direction,
            engage: self.state,
        })
    }
}
