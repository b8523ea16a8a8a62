//! `arena_shared`
//!
//! Shared libraries for the arena client core and its test harness.
//!
//! Design goals:
//! - Deterministic where it matters (movement, collision order).
//! - Closed sets of tagged variants for actions, entity kinds and events.
//! - Traits at the external seams (map, outbound actions, effects, clock).
//! - No `unsafe`.

pub mod action;
pub mod collision;
pub mod config;
pub mod ecs;
pub mod event;
pub mod math;
pub mod net;
pub mod physics;
pub mod time;
