//! Server-side services for the lift (requires the `web` feature).
//!
//! - `shared`: one `SharedLiftState<R>` wrapping the controller and watchdog
//! - `web`: Axum HTTP API and static UI
//! - `sensors`: tokio tasks reading the serial sensor nodes
//! - `runner`: update loop, watchdog loop, and shutdown
//!
//! # Shared State Pattern
//!
//! Every task shares a single controller through `SharedLiftState`:
//!
//! ```ignore
//! use std::sync::Arc;
//! use rs_lift::services::{build_router, spawn_update_loop, SharedLiftState};
//!
//! let state = Arc::new(SharedLiftState::new(controller, &config.safety));
//! spawn_update_loop(Arc::clone(&state), config.controller.update_interval_ms);
//! let router = build_router(Arc::clone(&state), &web_config);
//! ```

pub mod api;
pub mod runner;
pub mod sensors;
pub mod shared;
pub mod web;

pub use api::*;
pub use runner::*;
pub use sensors::*;
pub use shared::*;
pub use web::*;
