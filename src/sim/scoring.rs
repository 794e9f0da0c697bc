//! Throw resolution: ring lookup, stand/knock probabilities, score deltas
//!
//! Runs once per throw after every pin has settled. The thrown pin's final
//! upright state is rolled fresh here; knocks were already rolled during the
//! simulation and only get priced now.

use std::fmt::Write as _;

use super::rng::GameRng;
use super::state::{Pin, PinState, ThrowRuntime};
use crate::config::GameConfig;
use crate::consts::*;
use crate::distance_from_center;

/// Where a pin came to rest relative to the rings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingHit {
    /// Inside ring `index` (declaration order)
    Ring { index: usize, points: i64 },
    /// Outside every ring
    Outside { points: i64 },
}

impl RingHit {
    pub fn points(&self) -> i64 {
        match *self {
            RingHit::Ring { points, .. } | RingHit::Outside { points } => points,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match *self {
            RingHit::Ring { index, .. } => Some(index),
            RingHit::Outside { .. } => None,
        }
    }

    fn describe(&self) -> String {
        match *self {
            RingHit::Ring { index, points } => format!("ring {} ({} pts)", index + 1, points),
            RingHit::Outside { points } => format!("outside ({} pts)", points),
        }
    }
}

/// First ring (in declared order) with `inner <= dist < outer`
pub fn find_ring(config: &GameConfig, dist: f32) -> RingHit {
    config
        .rings
        .iter()
        .position(|ring| ring.contains(dist))
        .map(|index| RingHit::Ring {
            index,
            points: config.rings[index].points,
        })
        .unwrap_or(RingHit::Outside {
            points: config.outside_score,
        })
}

/// Chance the thrown pin ends up standing
pub fn stand_probability(config: &GameConfig, hit: RingHit, collision_count: u32) -> f32 {
    let mut p = config.base_stand_probability;
    if config.ring_bonus {
        if let Some(index) = hit.index() {
            p += config.rings.len().saturating_sub(index) as f32 * RING_BONUS_STEP;
        }
    }
    if config.collision_penalty {
        p -= COLLISION_PENALTY * collision_count as f32;
    }
    p.clamp(0.0, 1.0)
}

/// Chance an impact at `impact_speed` knocks a standing pin down
pub fn knock_probability(config: &GameConfig, impact_speed: f32) -> f32 {
    (config.base_knock_probability + config.impact_speed_factor * impact_speed).clamp(0.0, 1.0)
}

/// Outcome of resolving one throw
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Player who threw (1 or 2)
    pub thrower: u8,
    pub landing: RingHit,
    pub standing: bool,
    /// Score change for player 1 and player 2
    pub deltas: [i64; 2],
    pub description: String,
}

#[inline]
fn slot(player: u8) -> usize {
    if player == 2 { 1 } else { 0 }
}

/// Score a settled throw.
///
/// Rolls the thrown pin's final state (updating the pin) and prices every
/// knock. Returns `None` if the thrown pin is no longer on the board.
pub fn resolve_throw(
    pins: &mut [Pin],
    runtime: &ThrowRuntime,
    config: &GameConfig,
    rng: &mut GameRng,
) -> Option<Resolution> {
    let thrown = pins.iter_mut().find(|p| p.id == runtime.thrown_pin_id)?;
    let thrower = thrown.owner;

    let landing = find_ring(config, distance_from_center(thrown.pos));
    let p_stand = stand_probability(config, landing, runtime.collision_count);
    let standing = rng.chance(p_stand);
    thrown.state = if standing {
        PinState::Standing
    } else {
        PinState::Fallen
    };

    let mut deltas = [0i64; 2];
    let landing_score = (if standing { 2 } else { 1 }) * landing.points();
    deltas[slot(thrower)] += landing_score;

    let mut description = format!(
        "Player {} landed {} and {} (p={:.2}): {:+} to Player {}.",
        thrower,
        landing.describe(),
        if standing { "stayed standing" } else { "fell" },
        p_stand,
        landing_score,
        thrower
    );

    for &knocked_id in &runtime.knocked {
        let Some(knocked) = pins.iter().find(|p| p.id == knocked_id) else {
            continue;
        };
        let hit = find_ring(config, distance_from_center(knocked.pos));
        let bonus = (if standing { 4 } else { 2 }) * hit.points();
        // Only standing pins are ever knocked, so the owner always takes the
        // standing-pin penalty
        let penalty = 2 * hit.points();
        deltas[slot(thrower)] += bonus;
        deltas[slot(knocked.owner)] -= penalty;

        let _ = write!(
            description,
            " Knocked Player {}'s pin #{} in {}: {:+} to Player {}, {:+} to Player {}.",
            knocked.owner,
            knocked_id,
            hit.describe(),
            bonus,
            thrower,
            -penalty,
            knocked.owner
        );
    }

    Some(Resolution {
        thrower,
        landing,
        standing,
        deltas,
        description,
    })
}
