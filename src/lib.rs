//! Pin Toss - a turn-based pin-throwing game engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, collisions, scoring, turn phases)
//! - `config`: Tunable physics/scoring parameters and the ring layout

pub mod config;
pub mod sim;

pub use config::{ConfigError, ConfigPatch, GameConfig, Ring, RingPatch};
pub use sim::{Command, GamePhase, GameRng, GameState, Pin, PinState, Player, Snapshot};

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Pin footprint radius (collision circle in the horizontal plane)
    pub const PIN_RADIUS: f32 = 8.0;
    /// Pin height; a flying pin above this clears a standing pin
    pub const PIN_HEIGHT: f32 = 20.0;

    /// Launch speed at full power (units per step)
    pub const MAX_LAUNCH_SPEED: f32 = 16.0;
    /// Launch point sits this far inside the arena boundary
    pub const LAUNCH_INSET: f32 = 30.0;

    /// Arena boundary lies this far beyond the outermost ring
    pub const ARENA_MARGIN: f32 = 50.0;
    /// Velocity kept after bouncing off the arena boundary
    pub const WALL_DAMPING: f32 = 0.5;

    /// Horizontal friction while airborne (lighter than ground friction)
    pub const AIR_FRICTION: f32 = 0.995;
    /// A pin counts as grounded at or below this height...
    pub const GROUNDED_Z: f32 = 0.1;
    /// ...and with less vertical speed than this
    pub const GROUNDED_VZ: f32 = 0.5;
    /// Bounces softer than this snap the pin to the floor
    pub const MIN_BOUNCE_VZ: f32 = 0.5;

    /// Pin-on-pin restitution for the horizontal impulse
    pub const RESTITUTION: f32 = 0.5;
    /// Share of vertical velocity the striking pin keeps
    pub const IMPACT_VZ_KEEP: f32 = 0.7;
    /// Share of the striker's vertical velocity passed to the struck pin
    pub const IMPACT_VZ_TRANSFER: f32 = 0.3;

    /// Stand probability bonus per ring step toward the center
    pub const RING_BONUS_STEP: f32 = 0.1;
    /// Stand probability lost per collision of the thrown pin
    pub const COLLISION_PENALTY: f32 = 0.15;
}

/// Horizontal distance from the arena center
#[inline]
pub fn distance_from_center(pos: Vec3) -> f32 {
    pos.truncate().length()
}

/// Compass heading (degrees, 0 = +y, clockwise toward +x) to a unit vector
#[inline]
pub fn heading_to_dir(angle_deg: f32) -> Vec2 {
    let a = angle_deg.to_radians();
    Vec2::new(a.sin(), a.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_zero_points_up() {
        let d = heading_to_dir(0.0);
        assert!(d.x.abs() < 1e-6);
        assert!((d.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_heading_ninety_points_right() {
        let d = heading_to_dir(90.0);
        assert!((d.x - 1.0).abs() < 1e-6);
        assert!(d.y.abs() < 1e-6);
    }

    #[test]
    fn test_distance_ignores_height() {
        assert!((distance_from_center(Vec3::new(3.0, 4.0, 100.0)) - 5.0).abs() < 1e-6);
    }
}
