//! Hardware abstraction traits for relay outputs, presence feeds, and time.
//!
//! This module defines the seams that let rs-lift run against the real lift
//! (GPIO relays, serial presence sensors) or entirely on a desktop (mock
//! relays, simulated plant).
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`RelayOutput`] | Raw write to one motor-direction relay channel |
//! | [`PresenceFeed`] | Source of level presence events (sensors or simulation) |
//! | [`Clock`] | Monotonic millisecond time source |
//!
//! # Implementation
//!
//! For testing, use the mock implementations from [`crate::hal::mock`]. On a
//! Raspberry Pi, use [`crate::hal::GpioSetRelay`] together with a
//! [`crate::hal::LineFeed`] or the [`crate::SimulationEngine`].
//!
//! # Example
//!
//! ```rust
//! use rs_lift::traits::{Direction, RelayOutput};
//! use rs_lift::hal::MockRelay;
//!
//! let mut relay = MockRelay::new();
//! relay.set(Direction::Up, true).unwrap();
//! assert!(relay.up);
//! assert!(!relay.down);
//! ```

use core::fmt;

use crate::sensor::LevelPresence;

/// Direction of lift travel, and the name of the relay channel driving it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Towards the top level.
    Up,
    /// Towards the basement.
    Down,
}

impl Direction {
    /// Returns the direction as a lowercase string.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_lift::Direction;
    ///
    /// assert_eq!(Direction::Up.as_str(), "up");
    /// assert_eq!(Direction::Down.as_str(), "down");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Parse direction from text input.
    ///
    /// Input is trimmed and case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_lift::Direction;
    ///
    /// assert_eq!(Direction::from_text("up"), Some(Direction::Up));
    /// assert_eq!(Direction::from_text(" DOWN "), Some(Direction::Down));
    /// assert_eq!(Direction::from_text("sideways"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }

    /// The other direction.
    #[inline]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Direction needed to travel from `from_m` to `to_m`, `None` if equal.
    pub fn towards(from_m: f32, to_m: f32) -> Option<Direction> {
        let diff = to_m - from_m;
        if diff > 0.0 {
            Some(Direction::Up)
        } else if diff < 0.0 {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw relay output - abstracts the hardware behind one motor-direction channel.
///
/// Implementations perform the physical write unconditionally. Edge
/// triggering and the up/down interlock live one layer above, in
/// [`RelayActuator`](crate::RelayActuator).
///
/// # Implementation Notes
///
/// - A write must complete or fail in bounded time; never block indefinitely.
/// - A failed write must leave the caller free to assume the previous state.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use rs_lift::traits::{Direction, RelayOutput};
///
/// struct MyRelays { /* gpio handles */ }
///
/// impl RelayOutput for MyRelays {
///     type Error = std::io::Error;
///
///     fn set(&mut self, channel: Direction, energized: bool) -> Result<(), Self::Error> {
///         // Drive the pins for `channel`...
///         Ok(())
///     }
/// }
/// ```
pub trait RelayOutput {
    /// Error type for relay writes.
    type Error: fmt::Debug;

    /// Energize or release one relay channel.
    fn set(&mut self, channel: Direction, energized: bool) -> Result<(), Self::Error>;

    /// True when this output drives no real hardware.
    fn is_virtual(&self) -> bool {
        false
    }
}

/// Source of level presence events.
///
/// Exactly one feed is selected at startup: either real sensors
/// ([`LineFeed`](crate::hal::LineFeed)) or the
/// [`SimulationEngine`](crate::SimulationEngine). The controller cannot tell
/// them apart; both hand back decoded [`LevelPresence`] events in arrival order.
pub trait PresenceFeed {
    /// Told whenever the motor direction changes (`None` = stopped).
    ///
    /// Real sensors ignore this; the simulator uses it to move its virtual cab.
    fn set_motion(&mut self, motion: Option<Direction>, now_ms: u64);

    /// Collect events that became available since the last poll.
    fn poll(&mut self, now_ms: u64) -> Vec<LevelPresence>;

    /// True for a simulated plant.
    fn is_simulated(&self) -> bool {
        false
    }
}

impl<F: PresenceFeed + ?Sized> PresenceFeed for Box<F> {
    fn set_motion(&mut self, motion: Option<Direction>, now_ms: u64) {
        (**self).set_motion(motion, now_ms)
    }

    fn poll(&mut self, now_ms: u64) -> Vec<LevelPresence> {
        (**self).poll(now_ms)
    }

    fn is_simulated(&self) -> bool {
        (**self).is_simulated()
    }
}

/// Time source trait.
///
/// Provides monotonic time in milliseconds. The server's shared state reads
/// it for every command and tick; tests use [`MockClock`](crate::hal::MockClock).
///
/// # Example
///
/// ```rust
/// use rs_lift::traits::Clock;
/// use rs_lift::hal::MockClock;
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}

/// Wall-clock implementation of [`Clock`] based on `std::time::Instant`.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    start: std::time::Instant,
}

impl SystemClock {
    /// Create a clock whose epoch is now.
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Direction Tests
    // =========================================================================

    #[test]
    fn direction_from_text() {
        assert_eq!(Direction::from_text("up"), Some(Direction::Up));
        assert_eq!(Direction::from_text("Down"), Some(Direction::Down));
        assert_eq!(Direction::from_text("\tUP\n"), Some(Direction::Up));
        assert_eq!(Direction::from_text(""), None);
        assert_eq!(Direction::from_text("stop"), None);
    }

    #[test]
    fn direction_opposite() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Down.opposite(), Direction::Up);
    }

    #[test]
    fn direction_towards() {
        assert_eq!(Direction::towards(0.0, 3.0), Some(Direction::Up));
        assert_eq!(Direction::towards(1.5, -3.0), Some(Direction::Down));
        assert_eq!(Direction::towards(6.0, 6.0), None);
    }

    #[test]
    fn direction_display() {
        assert_eq!(Direction::Up.to_string(), "up");
        assert_eq!(format!("{}", Direction::Down), "down");
    }

    // =========================================================================
    // RelayOutput Default Methods Tests
    // =========================================================================

    struct TestRelay;

    impl RelayOutput for TestRelay {
        type Error = ();

        fn set(&mut self, _channel: Direction, _energized: bool) -> Result<(), ()> {
            Ok(())
        }
    }

    #[test]
    fn relay_output_is_real_by_default() {
        assert!(!TestRelay.is_virtual());
    }

    // =========================================================================
    // PresenceFeed Default Methods Tests
    // =========================================================================

    struct SilentFeed;

    impl PresenceFeed for SilentFeed {
        fn set_motion(&mut self, _motion: Option<Direction>, _now_ms: u64) {}

        fn poll(&mut self, _now_ms: u64) -> Vec<LevelPresence> {
            Vec::new()
        }
    }

    #[test]
    fn presence_feed_is_not_simulated_by_default() {
        let mut feed: Box<dyn PresenceFeed> = Box::new(SilentFeed);
        assert!(!feed.is_simulated());
        assert!(feed.poll(0).is_empty());
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
