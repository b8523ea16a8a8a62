//! `arena_client`
//!
//! Client-side systems:
//! - Entity store for players, monsters, props and bullets
//! - Prediction and ack-driven reconciliation of the local actor
//! - Interpolation for remote entity positions
//! - Bullet advance and collision resolution
//! - Fixed-order per-frame tick driver
//! - Stats snapshot for the UI layer
//!
//! Single-threaded: inbound messages go through [`GameClient::handle`]
//! between frames, never during [`GameClient::tick`].

pub mod bullets;
pub mod client;
pub mod collide;
pub mod input;
pub mod interp;
pub mod reconcile;
pub mod stats;
pub mod store;
pub mod tick;

pub use client::GameClient;
