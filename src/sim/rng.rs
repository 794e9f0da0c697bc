//! Seeded random source
//!
//! Every probabilistic decision in the sim draws from one `GameRng` owned by
//! the game state. The sequence is a pure function of the seed and the number
//! of draws, so a `(seed, cursor)` pair fully captures it.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Serialized form of the RNG: seed plus draws consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u32,
    pub cursor: u64,
}

impl From<GameRng> for RngState {
    fn from(rng: GameRng) -> Self {
        Self {
            seed: rng.seed,
            cursor: rng.cursor,
        }
    }
}

impl From<RngState> for GameRng {
    fn from(state: RngState) -> Self {
        let mut rng = GameRng::new(state.seed);
        rng.set_state(state.cursor);
        rng
    }
}

/// Deterministic PCG-backed generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RngState", into = "RngState")]
pub struct GameRng {
    inner: Pcg32,
    seed: u32,
    cursor: u64,
}

impl GameRng {
    pub fn new(seed: u32) -> Self {
        Self {
            inner: Pcg32::seed_from_u64(seed as u64),
            seed,
            cursor: 0,
        }
    }

    /// Restart the sequence from `seed`
    pub fn reset(&mut self, seed: u32) {
        *self = Self::new(seed);
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Number of draws consumed since seeding
    pub fn state(&self) -> u64 {
        self.cursor
    }

    /// Jump to the position reached after `cursor` draws from the seed
    pub fn set_state(&mut self, cursor: u64) {
        self.inner = Pcg32::seed_from_u64(self.seed as u64);
        self.inner.advance(cursor);
        self.cursor = cursor;
    }

    /// Uniform value in [0, 1)
    pub fn next(&mut self) -> f32 {
        self.cursor += 1;
        // Upper 24 bits fill the f32 mantissa exactly
        (self.inner.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform value in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next() * (max - min)
    }

    /// Uniform integer in [min, max], both inclusive
    pub fn rand_int(&mut self, min: i32, max: i32) -> i32 {
        // f64 so the top of the range cannot round up to max + 1
        let span = max as f64 + 1.0 - min as f64;
        (min as f64 + self.next() as f64 * span).floor() as i32
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        self.next() < p
    }
}
