//! Game state and core simulation types
//!
//! The authoritative state lives in `GameState`; everything a replay needs
//! (config, RNG position, pins, scores, log) is serializable.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::rng::GameRng;
use crate::config::GameConfig;
use crate::consts::*;

/// Current phase of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No active throw; config is editable
    Idle,
    /// Pins are moving; advanced one step per tick
    Simulating,
    /// Everything has settled; scoring runs once
    Resolving,
    /// Scores are final, waiting for the next turn
    TurnEnd,
}

/// Whether a pin is upright
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinState {
    Standing,
    Fallen,
}

/// A pin on the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: u32,
    /// Owning player (1 or 2)
    pub owner: u8,
    /// x, y on the floor plane; z is height (0 = ground)
    pub pos: Vec3,
    pub vel: Vec3,
    pub state: PinState,
    pub moving: bool,
}

impl Pin {
    /// A freshly thrown pin, upright and moving
    pub fn launched(id: u32, owner: u8, pos: Vec3, vel: Vec3) -> Self {
        Self {
            id,
            owner,
            pos,
            vel,
            state: PinState::Standing,
            moving: true,
        }
    }

    /// A pin resting on the floor
    pub fn at_rest(id: u32, owner: u8, x: f32, y: f32, state: PinState) -> Self {
        Self {
            id,
            owner,
            pos: Vec3::new(x, y, 0.0),
            vel: Vec3::ZERO,
            state,
            moving: false,
        }
    }

    /// On (or skimming) the floor with no real vertical motion
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.pos.z <= GROUNDED_Z && self.vel.z.abs() < GROUNDED_VZ
    }

    #[inline]
    pub fn horizontal_speed(&self) -> f32 {
        self.vel.truncate().length()
    }

    #[inline]
    pub fn is_standing(&self) -> bool {
        self.state == PinState::Standing
    }

    /// Zero all motion and put the pin on the floor
    pub fn settle(&mut self) {
        self.vel = Vec3::ZERO;
        self.pos.z = 0.0;
        self.moving = false;
    }
}

/// One of the two players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// 1 or 2
    pub id: u8,
    pub name: String,
    pub score: i64,
}

impl Player {
    pub fn new(id: u8) -> Self {
        Self {
            id,
            name: format!("Player {id}"),
            score: 0,
        }
    }
}

/// Bookkeeping for exactly one throw
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThrowRuntime {
    /// The pin whose contacts are scored
    pub thrown_pin_id: u32,
    /// Impacts involving the thrown pin
    pub collision_count: u32,
    /// Pins the thrown pin has already touched (judged at most once)
    pub collided: BTreeSet<u32>,
    /// Pins knocked down by the thrown pin
    pub knocked: BTreeSet<u32>,
    /// Impact speed that knocked each pin
    pub knock_speeds: BTreeMap<u32, f32>,
}

impl ThrowRuntime {
    pub fn new(thrown_pin_id: u32) -> Self {
        Self {
            thrown_pin_id,
            ..Default::default()
        }
    }

    /// Record a knock and its impact speed
    pub fn record_knock(&mut self, pin_id: u32, impact_speed: f32) {
        self.knocked.insert(pin_id);
        self.knock_speeds.insert(pin_id, impact_speed);
    }
}

/// An immutable log line with the score changes it applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: u32,
    pub description: String,
    /// Score change for player 1 and player 2
    pub deltas: [i64; 2],
    /// Turn number the entry belongs to
    pub turn: u32,
    /// Simulation step counter when it was written
    pub tick: u64,
}

/// Read-only view for rendering and score display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub config: GameConfig,
    pub players: [Player; 2],
    pub pins: Vec<Pin>,
    pub phase: GamePhase,
    pub active_player: u8,
    pub log: Vec<EventLogEntry>,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) config: GameConfig,
    pub(crate) rng: GameRng,
    /// Pins in insertion order (oldest first)
    pub(crate) pins: Vec<Pin>,
    pub(crate) players: [Player; 2],
    pub(crate) active_player: u8,
    pub(crate) phase: GamePhase,
    pub(crate) runtime: Option<ThrowRuntime>,
    pub(crate) log: Vec<EventLogEntry>,
    /// Turns started since reset
    pub(crate) turn: u32,
    /// Simulation steps run since reset
    pub(crate) time_ticks: u64,
    /// Next entity ID
    next_id: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        let rng = GameRng::new(config.seed);
        Self {
            config,
            rng,
            pins: Vec::new(),
            players: Self::default_players(),
            active_player: 1,
            phase: GamePhase::Idle,
            runtime: None,
            log: Vec::new(),
            turn: 0,
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Both players with zero scores
    pub fn default_players() -> [Player; 2] {
        [Player::new(1), Player::new(2)]
    }

    /// Allocate a new entity ID
    pub(crate) fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Put a resting pin on the board (board setup and tests).
    /// Capacity is not enforced here; only throws evict.
    pub fn place_pin(&mut self, owner: u8, x: f32, y: f32, state: PinState) -> u32 {
        let id = self.next_entity_id();
        self.pins.push(Pin::at_rest(id, owner, x, y, state));
        id
    }

    // === Read surface ===

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn player(&self, id: u8) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn pin(&self, id: u32) -> Option<&Pin> {
        self.pins.iter().find(|p| p.id == id)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn active_player(&self) -> u8 {
        self.active_player
    }

    pub fn log(&self) -> &[EventLogEntry] {
        &self.log
    }

    pub fn runtime(&self) -> Option<&ThrowRuntime> {
        self.runtime.as_ref()
    }

    pub fn rng(&self) -> &GameRng {
        &self.rng
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Owned copy of everything a renderer or scoreboard shows
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            config: self.config.clone(),
            players: self.players.clone(),
            pins: self.pins.clone(),
            phase: self.phase,
            active_player: self.active_player,
            log: self.log.clone(),
        }
    }
}

/// The other player of a two-player game
#[inline]
pub fn opponent(player: u8) -> u8 {
    if player == 1 { 2 } else { 1 }
}
