//! Game configuration
//!
//! Rings plus every tunable physics/scoring constant. Read-only while a throw
//! is in flight; the state machine only accepts edits while idle.

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::heading_to_dir;

/// Errors from loading or saving a config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A scoring annulus on the arena floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub points: i64,
}

impl Ring {
    pub fn new(inner_radius: f32, outer_radius: f32, points: i64) -> Self {
        Self {
            inner_radius,
            outer_radius,
            points,
        }
    }

    /// Half-open membership test: `inner <= dist < outer`
    #[inline]
    pub fn contains(&self, dist: f32) -> bool {
        self.inner_radius <= dist && dist < self.outer_radius
    }
}

/// All tunable physics and scoring parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Scoring layout ===
    /// Rings in lookup order (first match wins)
    pub rings: Vec<Ring>,
    /// Points for landing outside every ring
    pub outside_score: i64,

    // === Physics ===
    /// Horizontal velocity kept per step while grounded
    pub friction: f32,
    /// Vertical velocity lost per step
    pub gravity: f32,
    /// Vertical velocity kept on a floor bounce
    pub ground_restitution: f32,
    /// Horizontal speed below which a grounded pin stops
    pub stop_threshold: f32,
    /// Extra height above a pin's top at which collisions still register
    pub collision_z_threshold: f32,

    // === Probabilities ===
    pub base_stand_probability: f32,
    pub base_knock_probability: f32,
    /// Knock probability added per unit of impact speed
    pub impact_speed_factor: f32,
    /// Inner rings raise the stand probability
    pub ring_bonus: bool,
    /// Each collision of the thrown pin lowers the stand probability
    pub collision_penalty: bool,

    // === Board ===
    /// Maximum pins on the board; the oldest is evicted beyond this
    pub board_capacity: usize,
    /// RNG seed applied on reset
    pub seed: u32,

    // === Aim ===
    /// Heading in degrees (0 = straight at the center)
    pub angle: f32,
    /// Launch power in [0, 1]
    pub power: f32,
    /// Launch elevation in degrees
    pub pitch: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rings: vec![
                Ring::new(0.0, 50.0, 3),
                Ring::new(50.0, 100.0, 2),
                Ring::new(100.0, 150.0, 1),
            ],
            outside_score: 0,

            friction: 0.95,
            gravity: 0.4,
            ground_restitution: 0.3,
            stop_threshold: 0.1,
            collision_z_threshold: 5.0,

            base_stand_probability: 0.5,
            base_knock_probability: 0.3,
            impact_speed_factor: 0.05,
            ring_bonus: true,
            collision_penalty: true,

            board_capacity: 12,
            seed: 12345,

            angle: 0.0,
            power: 0.5,
            pitch: 15.0,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Config saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Largest outer radius over all rings (0 when there are none)
    pub fn max_ring_radius(&self) -> f32 {
        self.rings
            .iter()
            .map(|r| r.outer_radius)
            .fold(0.0, f32::max)
    }

    /// Radius of the arena boundary wall
    pub fn arena_radius(&self) -> f32 {
        self.max_ring_radius() + ARENA_MARGIN
    }

    /// Fixed point every throw starts from (on the ground, -y side)
    pub fn launch_point(&self) -> Vec3 {
        let r = (self.arena_radius() - LAUNCH_INSET).max(0.0);
        Vec3::new(0.0, -r, 0.0)
    }

    /// Initial velocity from the current power/angle/pitch
    pub fn launch_velocity(&self) -> Vec3 {
        let speed = self.power.clamp(0.0, 1.0) * MAX_LAUNCH_SPEED;
        let pitch = self.pitch.clamp(0.0, 90.0).to_radians();
        let h: Vec2 = heading_to_dir(self.angle) * (speed * pitch.cos());
        Vec3::new(h.x, h.y, speed * pitch.sin())
    }

    /// Apply a partial update
    pub fn apply_patch(&mut self, patch: &ConfigPatch) {
        macro_rules! set {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = &patch.$field { self.$field = v.clone(); })*
            };
        }
        set!(
            rings,
            outside_score,
            friction,
            gravity,
            ground_restitution,
            stop_threshold,
            collision_z_threshold,
            base_stand_probability,
            base_knock_probability,
            impact_speed_factor,
            ring_bonus,
            collision_penalty,
            board_capacity,
            seed,
            angle,
            power,
            pitch,
        );
    }

    /// Append a 50-unit ring worth 1 point just outside the current last ring
    pub fn add_ring(&mut self) {
        let inner = self.rings.last().map(|r| r.outer_radius).unwrap_or(0.0);
        self.rings.push(Ring::new(inner, inner + 50.0, 1));
    }

    /// Remove a ring; keeps at least one and ignores bad indices.
    /// Returns whether a ring was removed.
    pub fn remove_ring(&mut self, index: usize) -> bool {
        if self.rings.len() <= 1 || index >= self.rings.len() {
            return false;
        }
        self.rings.remove(index);
        true
    }

    /// Edit one ring in place. Returns whether the index existed.
    pub fn update_ring(&mut self, index: usize, patch: &RingPatch) -> bool {
        let Some(ring) = self.rings.get_mut(index) else {
            return false;
        };
        if let Some(v) = patch.inner_radius {
            ring.inner_radius = v;
        }
        if let Some(v) = patch.outer_radius {
            ring.outer_radius = v;
        }
        if let Some(v) = patch.points {
            ring.points = v;
        }
        true
    }
}

/// Partial config update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    pub rings: Option<Vec<Ring>>,
    pub outside_score: Option<i64>,
    pub friction: Option<f32>,
    pub gravity: Option<f32>,
    pub ground_restitution: Option<f32>,
    pub stop_threshold: Option<f32>,
    pub collision_z_threshold: Option<f32>,
    pub base_stand_probability: Option<f32>,
    pub base_knock_probability: Option<f32>,
    pub impact_speed_factor: Option<f32>,
    pub ring_bonus: Option<bool>,
    pub collision_penalty: Option<bool>,
    pub board_capacity: Option<usize>,
    pub seed: Option<u32>,
    pub angle: Option<f32>,
    pub power: Option<f32>,
    pub pitch: Option<f32>,
}

/// Partial ring update
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingPatch {
    pub inner_radius: Option<f32>,
    pub outer_radius: Option<f32>,
    pub points: Option<i64>,
}
