//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`].
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `gpio`: Relay board driven through `gpioset` (Raspberry Pi)
//! - `line_feed`: Presence events from serial sensor nodes

pub mod gpio;
pub mod line_feed;
pub mod mock;

pub use gpio::*;
pub use line_feed::*;
pub use mock::*;
