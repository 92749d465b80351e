//! API request and response types for the HTTP control panel.

use serde::{Deserialize, Serialize};

use crate::commands::CommandOutcome;
use crate::level::Level;
use crate::status::LiftStatus;

// Re-export request types from messages module
pub use crate::messages::{ControlRequest, FloorRequest};

// ============================================================================
// Response Types
// ============================================================================

/// API response wrapper for consistent JSON structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (present when success=true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present when success=false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Status as polled by the browser panel.
///
/// Field names match what the panel reads (`currentPosition`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// "Up" relay energized
    pub up: bool,
    /// "Down" relay energized
    pub down: bool,
    /// `"G"`, `"G - 1"`, or `"none"`
    pub current_position: String,
    /// Target of the trip in progress
    pub target_level: Option<Level>,
    /// Panel text
    pub display_message: String,
    /// `"Idle"`, `"Going Up"` or `"Going Down"`
    pub lift_state: String,
    /// Presence events come from the simulator
    pub simulated: bool,
}

impl From<&LiftStatus> for StatusResponse {
    fn from(status: &LiftStatus) -> Self {
        Self {
            up: status.relay_up,
            down: status.relay_down,
            current_position: status.position_label(),
            target_level: status.target,
            display_message: status.display_message.to_string(),
            lift_state: status.state.label().to_string(),
            simulated: status.simulated,
        }
    }
}

/// Command result response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Whether the command was accepted
    pub accepted: bool,
    /// Result details
    pub result: String,
}

impl CommandResponse {
    /// Create an accepted response
    pub fn accepted(result: impl Into<String>) -> Self {
        Self {
            accepted: true,
            result: result.into(),
        }
    }

    /// Create a rejected response
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            result: reason.into(),
        }
    }
}

impl From<CommandOutcome> for CommandResponse {
    fn from(outcome: CommandOutcome) -> Self {
        Self::accepted(outcome.as_str())
    }
}
