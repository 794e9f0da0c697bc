//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed step only, driven by the caller
//! - Seeded RNG only
//! - Stable iteration order (board insertion order)
//! - No rendering, timing or I/O

pub mod collision;
pub mod motion;
pub mod rng;
pub mod scoring;
pub mod state;
pub mod tick;

pub use collision::{Contact, apply_collision_response, check_collision, resolve_collisions};
pub use motion::integrate;
pub use rng::{GameRng, RngState};
pub use scoring::{RingHit, find_ring, knock_probability, stand_probability};
pub use state::{
    EventLogEntry, GamePhase, GameState, Pin, PinState, Player, Snapshot, ThrowRuntime,
};
pub use tick::Command;
