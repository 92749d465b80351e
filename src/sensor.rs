//! Presence sensor line decoding.
//!
//! Each level has a presence sensor on its own serial channel. The sensor
//! node prints newline-terminated reports of the form
//! `"<level> : <status>"`; only `LIFT HERE` and `LIFT AWAY` carry lift
//! presence. Every other report (door state, call buttons, start-up banners)
//! decodes to an error and is dropped by the caller.
//!
//! # Example
//!
//! ```rust
//! use rs_lift::sensor::{decode_line, LevelPresence};
//! use rs_lift::Level;
//!
//! let event = decode_line("1 : LIFT HERE\r").unwrap();
//! assert_eq!(event, LevelPresence::new(Level::First, true));
//! assert_eq!(event.to_string(), "1 : LIFT HERE");
//!
//! assert!(decode_line("1 : DOOR CLOSED").is_err());
//! ```

use core::fmt;

use crate::level::Level;

/// Separator between the level token and the status token.
pub const FIELD_SEPARATOR: &str = " : ";

/// Status token reported while the cab is at the sensor's level.
pub const STATUS_HERE: &str = "LIFT HERE";

/// Status token reported when the cab leaves the sensor's level.
pub const STATUS_AWAY: &str = "LIFT AWAY";

/// A decoded presence report for one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelPresence {
    /// Level whose sensor reported.
    pub level: Level,
    /// True when the cab is at `level`.
    pub present: bool,
}

impl LevelPresence {
    /// Create a presence event.
    pub const fn new(level: Level, present: bool) -> Self {
        Self { level, present }
    }

    /// The status token this event is reported with.
    pub const fn status(&self) -> &'static str {
        if self.present {
            STATUS_HERE
        } else {
            STATUS_AWAY
        }
    }
}

/// Formats the event exactly as the sensor node prints it.
impl fmt::Display for LevelPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.level, FIELD_SEPARATOR, self.status())
    }
}

/// Why a sensor line carried no presence event.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The line is not `"<level> : <status>"`.
    #[error("malformed sensor line: {0:?}")]
    Malformed(String),
    /// The level token is not a served level.
    #[error("unknown level {level:?} in sensor line")]
    UnknownLevel {
        /// The offending token.
        level: String,
    },
    /// A known level reported something other than lift presence.
    #[error("level {level} reported {status:?}")]
    UnknownStatus {
        /// Reporting level.
        level: Level,
        /// The status text.
        status: String,
    },
}

/// Decode one raw sensor line.
///
/// A single trailing `\r` and/or `\n` is tolerated, since the sensor nodes
/// terminate lines with CRLF.
pub fn decode_line(raw: &str) -> Result<LevelPresence, DecodeError> {
    let line = raw.trim_end_matches(['\r', '\n']);

    let mut fields = line.split(FIELD_SEPARATOR);
    let (Some(level_token), Some(status), None) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(DecodeError::Malformed(line.into()));
    };

    let level = Level::from_token(level_token).map_err(|_| DecodeError::UnknownLevel {
        level: level_token.into(),
    })?;

    let present = match status {
        STATUS_HERE => true,
        STATUS_AWAY => false,
        other => {
            return Err(DecodeError::UnknownStatus {
                level,
                status: other.into(),
            })
        }
    };

    Ok(LevelPresence { level, present })
}

/// Decode a line, logging and discarding anything that is not a presence report.
pub fn decode(raw: &str) -> Option<LevelPresence> {
    match decode_line(raw) {
        Ok(event) => Some(event),
        Err(err @ DecodeError::UnknownStatus { .. }) => {
            tracing::debug!(%err, "ignoring non-presence sensor report");
            None
        }
        Err(err) => {
            tracing::warn!(%err, "dropping sensor line");
            None
        }
    }
}
