//! Read-only status snapshot for the control panel.

use crate::display::MessageText;
use crate::level::{Level, Position};
use crate::LiftState;

/// Full state snapshot for UI/API.
///
/// # Example
///
/// ```rust
/// use rs_lift::{LiftController, LiftState};
/// use rs_lift::hal::{MockFeed, MockRelay};
///
/// let lift = LiftController::new(MockRelay::new(), MockFeed::new());
/// let status = lift.status(0);
/// assert!(!status.relay_up && !status.relay_down);
/// assert_eq!(status.position, None);
/// assert_eq!(status.state, LiftState::Idle);
/// assert_eq!(status.display_message, "Idle");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LiftStatus {
    /// "Up" relay energized.
    pub relay_up: bool,
    /// "Down" relay energized.
    pub relay_down: bool,
    /// Best-known position; `None` before the first presence report.
    pub position: Option<Position>,
    /// Target of the automatic trip in progress.
    pub target: Option<Level>,
    /// Motion state.
    pub state: LiftState,
    /// Transient message, or the state label once it has expired.
    pub display_message: MessageText,
    /// True when presence events come from the simulator.
    pub simulated: bool,
}

impl LiftStatus {
    /// Position formatted for the panel: `"G"`, `"G - 1"`, or `"none"`.
    pub fn position_label(&self) -> String {
        self.position
            .map_or_else(|| "none".to_string(), |p| p.to_string())
    }
}

impl Default for LiftStatus {
    fn default() -> Self {
        Self {
            relay_up: false,
            relay_down: false,
            position: None,
            target: None,
            state: LiftState::Idle,
            display_message: MessageText::new(),
            simulated: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_label_formats() {
        let mut status = LiftStatus::default();
        assert_eq!(status.position_label(), "none");

        status.position = Some(Position::At(Level::Basement));
        assert_eq!(status.position_label(), "B");

        status.position = Position::between(Level::Ground, Level::First);
        assert_eq!(status.position_label(), "G - 1");
    }
}
