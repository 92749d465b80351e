//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for the hardware traits, enabling
//! development and testing on desktop without relays or sensor nodes.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockRelay`] | [`RelayOutput`] | Records relay writes, injects failures |
//! | [`MockFeed`] | [`PresenceFeed`] | Queued presence events, records motion |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//!
//! # Example
//!
//! ```rust
//! use rs_lift::{Level, LiftController};
//! use rs_lift::hal::{MockFeed, MockRelay};
//!
//! // Create controller with mock hardware
//! let feed = MockFeed::new();
//! let mut lift = LiftController::new(MockRelay::new(), feed.clone());
//!
//! // Queue a sensor line and let the controller pick it up
//! feed.push_line("G : LIFT HERE");
//! lift.update(0).unwrap();
//! lift.request_floor(Level::Second, 10).unwrap();
//!
//! // Verify via the recorded writes
//! assert!(lift.relay_output().up);
//! ```
//!
//! [`RelayOutput`]: crate::traits::RelayOutput
//! [`PresenceFeed`]: crate::traits::PresenceFeed
//! [`Clock`]: crate::traits::Clock

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::sensor::{self, LevelPresence};
use crate::traits::{Clock, Direction, PresenceFeed, RelayOutput};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock relay pair for testing.
///
/// Records every accepted write. Set `fail_writes` to make every write fail,
/// or `failing_channel` to fail one channel. Failed writes leave the
/// recorded state unchanged.
///
/// # Example
///
/// ```rust
/// use rs_lift::hal::MockRelay;
/// use rs_lift::traits::{Direction, RelayOutput};
///
/// let mut relay = MockRelay::new();
/// relay.set(Direction::Down, true).unwrap();
/// assert!(relay.down);
///
/// relay.fail_writes = true;
/// assert!(relay.set(Direction::Down, false).is_err());
/// assert!(relay.down);
/// assert_eq!(relay.writes, vec![(Direction::Down, true)]);
/// ```
#[derive(Debug, Default)]
pub struct MockRelay {
    /// Current "up" channel state.
    pub up: bool,
    /// Current "down" channel state.
    pub down: bool,
    /// Accepted writes in order.
    pub writes: Vec<(Direction, bool)>,
    /// When true, every write fails.
    pub fail_writes: bool,
    /// When set, writes to this channel fail.
    pub failing_channel: Option<Direction>,
}

impl MockRelay {
    /// Creates a new mock with both channels released.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if both channels were ever on at the same time.
    pub fn ever_both_on(&self) -> bool {
        let (mut up, mut down) = (false, false);
        self.writes.iter().any(|&(channel, energized)| {
            match channel {
                Direction::Up => up = energized,
                Direction::Down => down = energized,
            }
            up && down
        })
    }
}

impl RelayOutput for MockRelay {
    type Error = ();

    fn set(&mut self, channel: Direction, energized: bool) -> Result<(), Self::Error> {
        if self.fail_writes || self.failing_channel == Some(channel) {
            return Err(());
        }
        match channel {
            Direction::Up => self.up = energized,
            Direction::Down => self.down = energized,
        }
        self.writes.push((channel, energized));
        Ok(())
    }

    fn is_virtual(&self) -> bool {
        true
    }
}

// ============================================================================
// Feed Mock
// ============================================================================

#[derive(Debug, Default)]
struct FeedInner {
    queue: VecDeque<LevelPresence>,
    motions: Vec<Option<Direction>>,
}

/// Mock presence feed.
///
/// Clones share one queue, so a test can keep a handle after moving the
/// feed into a controller.
///
/// # Example
///
/// ```rust
/// use rs_lift::hal::MockFeed;
/// use rs_lift::traits::{Direction, PresenceFeed};
///
/// let handle = MockFeed::new();
/// let mut feed = handle.clone();
///
/// handle.push_line("1 : LIFT AWAY");
/// assert_eq!(feed.poll(0).len(), 1);
/// assert!(feed.poll(0).is_empty());
///
/// feed.set_motion(Some(Direction::Down), 0);
/// assert_eq!(handle.motions(), vec![Some(Direction::Down)]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockFeed {
    inner: Arc<Mutex<FeedInner>>,
}

impl MockFeed {
    /// Creates an empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next poll.
    pub fn push(&self, event: LevelPresence) {
        self.lock().queue.push_back(event);
    }

    /// Decode a raw sensor line and queue it; malformed lines are dropped.
    pub fn push_line(&self, raw: &str) {
        if let Some(event) = sensor::decode(raw) {
            self.push(event);
        }
    }

    /// Every motion change the feed was told about.
    pub fn motions(&self) -> Vec<Option<Direction>> {
        self.lock().motions.clone()
    }

    /// Number of queued events.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FeedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PresenceFeed for MockFeed {
    fn set_motion(&mut self, motion: Option<Direction>, _now_ms: u64) {
        self.lock().motions.push(motion);
    }

    fn poll(&mut self, _now_ms: u64) -> Vec<LevelPresence> {
        self.lock().queue.drain(..).collect()
    }
}

// ============================================================================
// Clock Mock
// ============================================================================

/// Mock clock for testing time-dependent behavior.
///
/// Clones share one time value, so a test can keep a handle to a clock it
/// has handed to the server's shared state.
///
/// # Example
///
/// ```rust
/// use rs_lift::hal::MockClock;
/// use rs_lift::traits::Clock;
///
/// let clock = MockClock::new();
/// let handle = clock.clone();
/// assert_eq!(clock.now_ms(), 0);
///
/// handle.set(1000);
/// assert_eq!(clock.now_ms(), 1000);
///
/// handle.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockClock {
    current_ms: Arc<AtomicU64>,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current time in milliseconds.
    pub fn set(&self, ms: u64) {
        self.current_ms.store(ms, Ordering::SeqCst);
    }

    /// Advances time by the given milliseconds.
    pub fn advance(&self, ms: u64) {
        self.current_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    #[test]
    fn relay_records_only_accepted_writes() {
        let mut relay = MockRelay::new();
        relay.set(Direction::Up, true).unwrap();
        relay.fail_writes = true;
        assert!(relay.set(Direction::Up, false).is_err());
        assert!(relay.up);
        assert_eq!(relay.writes.len(), 1);
    }

    #[test]
    fn failing_channel_only_rejects_that_channel() {
        let mut relay = MockRelay::new();
        relay.failing_channel = Some(Direction::Down);
        assert!(relay.set(Direction::Down, true).is_err());
        assert!(relay.set(Direction::Up, true).is_ok());
        assert_eq!(relay.writes, vec![(Direction::Up, true)]);
    }

    #[test]
    fn ever_both_on_detects_overlap() {
        let mut relay = MockRelay::new();
        relay.set(Direction::Up, true).unwrap();
        relay.set(Direction::Up, false).unwrap();
        relay.set(Direction::Down, true).unwrap();
        assert!(!relay.ever_both_on());

        relay.set(Direction::Up, true).unwrap();
        assert!(relay.ever_both_on());
    }

    #[test]
    fn feed_drains_in_order() {
        let mut feed = MockFeed::new();
        feed.push(LevelPresence::new(Level::Ground, false));
        feed.push(LevelPresence::new(Level::First, true));
        assert_eq!(feed.pending(), 2);

        let events = feed.poll(0);
        assert_eq!(events[0], LevelPresence::new(Level::Ground, false));
        assert_eq!(events[1], LevelPresence::new(Level::First, true));
        assert_eq!(feed.pending(), 0);
    }

    #[test]
    fn feed_drops_malformed_lines() {
        let feed = MockFeed::new();
        feed.push_line("Arduino ready");
        feed.push_line("G : DOOR OPEN");
        assert_eq!(feed.pending(), 0);
    }

    #[test]
    fn clock_advances() {
        let clock = MockClock::new();
        clock.advance(20);
        clock.advance(20);
        assert_eq!(clock.now_ms(), 40);
    }

    #[test]
    fn clock_clones_share_time() {
        let clock = MockClock::new();
        let handle = clock.clone();
        handle.set(1_000);
        assert_eq!(clock.now_ms(), 1_000);
    }
}
