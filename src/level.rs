//! The fixed set of levels the lift serves and the lift's position along them.
//!
//! Levels are ordered bottom to top (`B`, `G`, `1`, `2`); that ordering is what
//! "up" and "down" mean everywhere else in the crate. Each level has a fixed
//! height in meters, used for direction decisions and by the simulator.
//!
//! # Example
//!
//! ```rust
//! use rs_lift::{Level, Position};
//!
//! let level: Level = "1".parse().unwrap();
//! assert_eq!(level.above(), Some(Level::Second));
//! assert_eq!(level.height_m(), 3.0);
//!
//! let pos = Position::between(Level::Ground, Level::First).unwrap();
//! assert_eq!(pos.to_string(), "G - 1");
//! assert_eq!(pos.height_m(), 1.5);
//! ```

use core::fmt;
use core::str::FromStr;

use crate::traits::Direction;

/// One of the lift's stopping points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Level {
    /// Basement, the bottom terminal level.
    #[cfg_attr(feature = "serde", serde(rename = "B"))]
    Basement,
    /// Ground floor.
    #[cfg_attr(feature = "serde", serde(rename = "G"))]
    Ground,
    /// First floor.
    #[cfg_attr(feature = "serde", serde(rename = "1"))]
    First,
    /// Second floor, the top terminal level.
    #[cfg_attr(feature = "serde", serde(rename = "2"))]
    Second,
}

/// Number of levels served.
pub const LEVEL_COUNT: usize = 4;

impl Level {
    /// All levels, bottom to top.
    pub const ALL: [Level; LEVEL_COUNT] =
        [Level::Basement, Level::Ground, Level::First, Level::Second];

    /// Bottom terminal level.
    pub const BOTTOM: Level = Level::Basement;

    /// Top terminal level.
    pub const TOP: Level = Level::Second;

    /// Position in the bottom-to-top ordering.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Level::Basement => 0,
            Level::Ground => 1,
            Level::First => 2,
            Level::Second => 3,
        }
    }

    /// Level at the given ordering index.
    pub const fn from_index(index: usize) -> Option<Level> {
        if index < LEVEL_COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Token used on the sensor wire and in the HTTP API.
    pub const fn token(self) -> &'static str {
        match self {
            Level::Basement => "B",
            Level::Ground => "G",
            Level::First => "1",
            Level::Second => "2",
        }
    }

    /// Parse a level token. Surrounding whitespace is ignored.
    pub fn from_token(token: &str) -> Result<Level, InvalidLevel> {
        match token.trim() {
            "B" => Ok(Level::Basement),
            "G" => Ok(Level::Ground),
            "1" => Ok(Level::First),
            "2" => Ok(Level::Second),
            other => Err(InvalidLevel(other.into())),
        }
    }

    /// Height of the level above ground, in meters.
    pub const fn height_m(self) -> f32 {
        match self {
            Level::Basement => -3.0,
            Level::Ground => 0.0,
            Level::First => 3.0,
            Level::Second => 6.0,
        }
    }

    /// The next level up, if any.
    pub const fn above(self) -> Option<Level> {
        Self::from_index(self.index() + 1)
    }

    /// The next level down, if any.
    pub const fn below(self) -> Option<Level> {
        match self.index() {
            0 => None,
            i => Self::from_index(i - 1),
        }
    }

    /// The adjacent level in the given direction of travel.
    pub const fn adjacent(self, direction: Direction) -> Option<Level> {
        match direction {
            Direction::Up => self.above(),
            Direction::Down => self.below(),
        }
    }

    /// True for the topmost and bottommost levels.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Level::Basement | Level::Second)
    }

    /// The terminal level the lift must not run past in `direction`.
    pub const fn limit(direction: Direction) -> Level {
        match direction {
            Direction::Up => Self::TOP,
            Direction::Down => Self::BOTTOM,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Level {
    type Err = InvalidLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::from_token(s)
    }
}

/// A level token that is not one of `B`, `G`, `1`, `2`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid level: {0:?}")]
pub struct InvalidLevel(pub String);

/// Best-known position of the lift cab.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    /// Stationed at a level.
    At(Level),
    /// Travelling between two adjacent levels.
    Between {
        /// The lower of the two levels.
        lower: Level,
        /// The level directly above `lower`.
        upper: Level,
    },
}

impl Position {
    /// Build a `Between` position; `None` unless `upper` is directly above `lower`.
    pub fn between(lower: Level, upper: Level) -> Option<Position> {
        (lower.above() == Some(upper)).then_some(Position::Between { lower, upper })
    }

    /// The gap entered when leaving `level` in `direction`.
    ///
    /// Returns `None` when `level` is the terminal level in that direction.
    pub fn leaving(level: Level, direction: Direction) -> Option<Position> {
        let next = level.adjacent(direction)?;
        match direction {
            Direction::Up => Position::between(level, next),
            Direction::Down => Position::between(next, level),
        }
    }

    /// Numeric height estimate in meters.
    ///
    /// A `Between` position is taken to be halfway up the gap.
    pub fn height_m(&self) -> f32 {
        match *self {
            Position::At(level) => level.height_m(),
            Position::Between { lower, upper } => {
                lower.height_m() + (upper.height_m() - lower.height_m()) / 2.0
            }
        }
    }

    /// The level, when stationed at one.
    pub fn level(&self) -> Option<Level> {
        match *self {
            Position::At(level) => Some(level),
            Position::Between { .. } => None,
        }
    }

    /// True while between two levels.
    pub fn is_between(&self) -> bool {
        matches!(self, Position::Between { .. })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::At(level) => write!(f, "{level}"),
            Position::Between { lower, upper } => write!(f, "{lower} - {upper}"),
        }
    }
}
