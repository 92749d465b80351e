//! Best-known lift position from presence events.
//!
//! The tracker is the only owner of [`Position`]. A `LIFT HERE` report is the
//! single authoritative arrival signal. A `LIFT AWAY` report for the level the
//! cab was at moves the estimate into the gap towards the adjacent level in
//! the direction the relays are driving.
//!
//! When motion ends away from any level, [`PositionTracker::settle`] reports
//! the cab at the last level it was seen at, but remembers the gap so the next
//! trip still starts from the right height estimate.

use crate::level::{Level, Position, LEVEL_COUNT};
use crate::sensor::LevelPresence;
use crate::traits::Direction;

/// Tracks position from presence events.
///
/// # Example
///
/// ```rust
/// use rs_lift::{Direction, Level, Position, PositionTracker};
/// use rs_lift::sensor::LevelPresence;
///
/// let mut tracker = PositionTracker::new();
/// tracker.on_event(LevelPresence::new(Level::Ground, true), None);
/// assert_eq!(tracker.position(), Some(Position::At(Level::Ground)));
///
/// tracker.on_event(LevelPresence::new(Level::Ground, false), Some(Direction::Up));
/// assert_eq!(tracker.position(), Position::between(Level::Ground, Level::First));
/// ```
#[derive(Clone, Debug, Default)]
pub struct PositionTracker {
    current_level: Option<Level>,
    position: Option<Position>,
    presence: [bool; LEVEL_COUNT],
    gap: Option<Position>,
}

impl PositionTracker {
    /// A tracker that has not seen any events yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one presence event.
    ///
    /// `moving` is the direction currently driven by the relays. Returns the
    /// level when the event is an arrival (`present = true`).
    pub fn on_event(&mut self, event: LevelPresence, moving: Option<Direction>) -> Option<Level> {
        let LevelPresence { level, present } = event;
        self.presence[level.index()] = present;

        if present {
            self.current_level = Some(level);
            self.position = Some(Position::At(level));
            self.gap = None;
            return Some(level);
        }

        let Some(direction) = moving else {
            return None;
        };
        if self.position != Some(Position::At(level)) {
            return None;
        }
        tracing::debug!(%level, %direction, "lift left level");
        // Leaving past a terminal level has no gap to move into.
        if let Some(gap) = Position::leaving(level, direction) {
            self.position = Some(gap);
            self.gap = Some(gap);
        }
        None
    }

    /// Collapse a `Between` estimate once motion has stopped.
    ///
    /// The reported position becomes the last level the cab was seen at. The
    /// gap is kept for [`height_estimate_m`](Self::height_estimate_m).
    pub fn settle(&mut self) {
        if matches!(self.position, Some(Position::Between { .. })) {
            self.position = self.current_level.map(Position::At);
        }
    }

    /// Reported position, `None` until the first presence report.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// The last level the cab was seen at.
    pub fn current_level(&self) -> Option<Level> {
        self.current_level
    }

    /// Last reported presence of `level`'s sensor.
    pub fn is_present(&self, level: Level) -> bool {
        self.presence[level.index()]
    }

    /// True if the cab is reported at `level` and its sensor confirms it.
    pub fn is_confirmed_at(&self, level: Level) -> bool {
        self.position == Some(Position::At(level)) && self.is_present(level)
    }

    /// Numeric height used to pick a travel direction.
    ///
    /// Uses the remembered gap when the cab stopped between levels.
    pub fn height_estimate_m(&self) -> Option<f32> {
        self.gap.or(self.position).map(|p| p.height_m())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn here(level: Level) -> LevelPresence {
        LevelPresence::new(level, true)
    }

    fn away(level: Level) -> LevelPresence {
        LevelPresence::new(level, false)
    }

    #[test]
    fn unknown_until_first_report() {
        let tracker = PositionTracker::new();
        assert_eq!(tracker.position(), None);
        assert_eq!(tracker.current_level(), None);
        assert_eq!(tracker.height_estimate_m(), None);
    }

    #[test]
    fn arrival_sets_level_and_reports_it() {
        let mut tracker = PositionTracker::new();
        assert_eq!(tracker.on_event(here(Level::First), None), Some(Level::First));
        assert_eq!(tracker.position(), Some(Position::At(Level::First)));
        assert!(tracker.is_confirmed_at(Level::First));
    }

    #[test]
    fn leaving_while_moving_down_enters_lower_gap() {
        let mut tracker = PositionTracker::new();
        tracker.on_event(here(Level::First), None);
        assert_eq!(tracker.on_event(away(Level::First), Some(Direction::Down)), None);
        assert_eq!(
            tracker.position(),
            Position::between(Level::Ground, Level::First)
        );
    }

    #[test]
    fn leaving_while_idle_keeps_position() {
        let mut tracker = PositionTracker::new();
        tracker.on_event(here(Level::Ground), None);
        tracker.on_event(away(Level::Ground), None);
        assert_eq!(tracker.position(), Some(Position::At(Level::Ground)));
        assert!(!tracker.is_present(Level::Ground));
        assert!(!tracker.is_confirmed_at(Level::Ground));
    }

    #[test]
    fn away_report_for_other_level_is_ignored() {
        let mut tracker = PositionTracker::new();
        tracker.on_event(here(Level::Ground), None);
        tracker.on_event(away(Level::Second), Some(Direction::Up));
        assert_eq!(tracker.position(), Some(Position::At(Level::Ground)));
    }

    #[cfg(feature = "web")]
    #[test]
    fn only_real_departures_are_logged() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tracing_subscriber::layer::{Context, SubscriberExt};

        struct CountEvents(Arc<AtomicUsize>);

        impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for CountEvents {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                if event.metadata().target() == "rs_lift::position" {
                    self.0.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(CountEvents(Arc::clone(&count)));
        tracing::subscriber::with_default(subscriber, || {
            let mut tracker = PositionTracker::new();
            tracker.on_event(here(Level::Ground), None);
            tracker.on_event(away(Level::Ground), None);
            tracker.on_event(away(Level::Second), Some(Direction::Up));
            assert_eq!(count.load(Ordering::SeqCst), 0);

            tracker.on_event(here(Level::Ground), None);
            tracker.on_event(away(Level::Ground), Some(Direction::Up));
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn leaving_past_terminal_clamps() {
        let mut tracker = PositionTracker::new();
        tracker.on_event(here(Level::Second), None);
        tracker.on_event(away(Level::Second), Some(Direction::Up));
        assert_eq!(tracker.position(), Some(Position::At(Level::Second)));

        tracker.on_event(here(Level::Basement), None);
        tracker.on_event(away(Level::Basement), Some(Direction::Down));
        assert_eq!(tracker.position(), Some(Position::At(Level::Basement)));
    }

    #[test]
    fn settle_collapses_gap_but_keeps_estimate() {
        let mut tracker = PositionTracker::new();
        tracker.on_event(here(Level::Ground), None);
        tracker.on_event(away(Level::Ground), Some(Direction::Up));
        tracker.settle();

        assert_eq!(tracker.position(), Some(Position::At(Level::Ground)));
        assert_eq!(tracker.height_estimate_m(), Some(1.5));
        assert!(!tracker.is_confirmed_at(Level::Ground));
    }

    #[test]
    fn arrival_clears_remembered_gap() {
        let mut tracker = PositionTracker::new();
        tracker.on_event(here(Level::Ground), None);
        tracker.on_event(away(Level::Ground), Some(Direction::Up));
        tracker.settle();
        tracker.on_event(here(Level::First), None);
        assert_eq!(tracker.height_estimate_m(), Some(3.0));
    }

    #[test]
    fn settle_when_at_level_is_noop() {
        let mut tracker = PositionTracker::new();
        tracker.on_event(here(Level::First), None);
        tracker.settle();
        assert_eq!(tracker.position(), Some(Position::At(Level::First)));
    }
}
