//! Trait definitions for hardware abstraction.
//!
//! This module defines the core abstractions that allow rs-lift to:
//! - Drive real relays or a mock
//! - Consume presence events from real sensors or a simulated plant
//! - Run against a real or a controllable clock
//!
//! # Hardware Abstraction
//!
//! The key hardware traits are:
//!
//! - [`RelayOutput`]: one write per motor-direction relay channel
//! - [`PresenceFeed`]: ordered stream of decoded presence events
//! - [`Clock`]: monotonic time source

pub mod hardware;

pub use hardware::*;
