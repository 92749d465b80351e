//! Edge-triggered, interlocked relay pair.
//!
//! [`RelayActuator`] wraps a raw [`RelayOutput`] and owns the last state
//! successfully written to each channel. Writes that would not change a
//! channel are dropped before reaching hardware, and energizing one channel
//! always releases the other first, so `up && down` can never be observed.

use crate::traits::{Direction, RelayOutput};

/// State of the two motor-direction relays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelayPair {
    /// "Up" relay energized.
    pub up: bool,
    /// "Down" relay energized.
    pub down: bool,
}

impl RelayPair {
    /// Read one channel.
    pub const fn get(&self, channel: Direction) -> bool {
        match channel {
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    fn set(&mut self, channel: Direction, energized: bool) {
        match channel {
            Direction::Up => self.up = energized,
            Direction::Down => self.down = energized,
        }
    }

    /// The direction currently driven, if any.
    pub const fn direction(&self) -> Option<Direction> {
        match (self.up, self.down) {
            (true, false) => Some(Direction::Up),
            (false, true) => Some(Direction::Down),
            _ => None,
        }
    }

    /// True if either relay is energized.
    pub const fn any(&self) -> bool {
        self.up || self.down
    }
}

/// A relay write that the hardware rejected.
#[derive(Debug)]
pub struct WriteFailure<E> {
    /// Channel being written.
    pub channel: Direction,
    /// Backend error.
    pub cause: E,
}

/// Edge-triggered actuator over a [`RelayOutput`].
///
/// # Example
///
/// ```rust
/// use rs_lift::{RelayActuator, Direction};
/// use rs_lift::hal::MockRelay;
///
/// let mut relays = RelayActuator::new(MockRelay::new());
/// relays.write(Direction::Down, true).unwrap();
/// relays.write(Direction::Up, true).unwrap(); // releases "down" first
///
/// assert!(relays.read(Direction::Up));
/// assert!(!relays.read(Direction::Down));
/// assert_eq!(relays.output().writes.len(), 3);
/// ```
#[derive(Debug)]
pub struct RelayActuator<R: RelayOutput> {
    output: R,
    state: RelayPair,
}

impl<R: RelayOutput> RelayActuator<R> {
    /// Wrap an output. Both channels are assumed released.
    pub fn new(output: R) -> Self {
        Self {
            output,
            state: RelayPair::default(),
        }
    }

    /// Set one channel.
    ///
    /// A no-op when the channel already has the requested state. Energizing
    /// a channel releases the opposite one first; if that release fails the
    /// requested channel is left untouched.
    pub fn write(&mut self, channel: Direction, energized: bool) -> Result<(), WriteFailure<R::Error>> {
        if self.state.get(channel) == energized {
            return Ok(());
        }
        if energized {
            self.write_edge(channel.opposite(), false)?;
        }
        self.write_edge(channel, energized)
    }

    /// Drive `direction`, releasing the opposite channel.
    pub fn engage(&mut self, direction: Direction) -> Result<(), WriteFailure<R::Error>> {
        self.write(direction, true)
    }

    /// Release both channels.
    ///
    /// Both releases are attempted even if the first fails; the first
    /// failure is returned.
    pub fn release_all(&mut self) -> Result<(), WriteFailure<R::Error>> {
        let up = self.write(Direction::Up, false);
        let down = self.write(Direction::Down, false);
        up.and(down)
    }

    /// Last successfully written state of `channel`.
    #[inline]
    pub fn read(&self, channel: Direction) -> bool {
        self.state.get(channel)
    }

    /// Both channels.
    #[inline]
    pub fn state(&self) -> RelayPair {
        self.state
    }

    /// The wrapped output.
    pub fn output(&self) -> &R {
        &self.output
    }

    /// Mutable access to the wrapped output (fault injection in tests).
    pub fn output_mut(&mut self) -> &mut R {
        &mut self.output
    }

    fn write_edge(&mut self, channel: Direction, energized: bool) -> Result<(), WriteFailure<R::Error>> {
        if self.state.get(channel) == energized {
            return Ok(());
        }
        match self.output.set(channel, energized) {
            Ok(()) => {
                self.state.set(channel, energized);
                tracing::info!(
                    relay = channel.as_str(),
                    state = if energized { "ON" } else { "OFF" },
                    virtual_output = self.output.is_virtual(),
                    "relay switched"
                );
                Ok(())
            }
            Err(cause) => {
                tracing::error!(relay = channel.as_str(), energized, ?cause, "relay write failed");
                Err(WriteFailure { channel, cause })
            }
        }
    }
}
