//! Turn state machine
//!
//! idle --throw--> simulating --step*--> resolving --resolve--> turn end
//! --next turn--> idle, with reset available from anywhere. Commands that
//! don't fit the current phase are ignored.

use serde::{Deserialize, Serialize};

use super::collision::{judge_thrown_contacts, resolve_collisions};
use super::motion::integrate;
use super::scoring;
use super::state::{EventLogEntry, GamePhase, GameState, Pin, ThrowRuntime, opponent};
use crate::config::{ConfigPatch, RingPatch};

/// Commands from the UI layer (one entry point for scripted play and replays)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    UpdateConfig(ConfigPatch),
    UpdateRing { index: usize, patch: RingPatch },
    AddRing,
    RemoveRing(usize),
    SetThrowParams { angle: f32, power: f32 },
    Throw,
    Step,
    Resolve,
    NextTurn,
    Reset,
}

impl GameState {
    /// Dispatch a command. Returns `false` for `Step` once everything has
    /// settled, `true` otherwise.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::UpdateConfig(patch) => self.update_config(&patch),
            Command::UpdateRing { index, patch } => self.update_ring(index, &patch),
            Command::AddRing => self.add_ring(),
            Command::RemoveRing(index) => self.remove_ring(index),
            Command::SetThrowParams { angle, power } => self.set_throw_params(angle, power),
            Command::Throw => {
                self.throw_pin();
            }
            Command::Step => return self.advance_simulation_step(),
            Command::Resolve => self.resolve_throw(),
            Command::NextTurn => self.next_turn(),
            Command::Reset => self.reset(),
        }
        true
    }

    fn require_phase(&self, phase: GamePhase, command: &str) -> bool {
        if self.phase != phase {
            log::debug!("ignoring {} during {:?}", command, self.phase);
            return false;
        }
        true
    }

    // === Configuration (idle only) ===

    pub fn update_config(&mut self, patch: &ConfigPatch) {
        if self.require_phase(GamePhase::Idle, "config update") {
            self.config.apply_patch(patch);
        }
    }

    pub fn update_ring(&mut self, index: usize, patch: &RingPatch) {
        if self.require_phase(GamePhase::Idle, "ring update") && !self.config.update_ring(index, patch) {
            log::debug!("no ring at index {}", index);
        }
    }

    pub fn add_ring(&mut self) {
        if self.require_phase(GamePhase::Idle, "add ring") {
            self.config.add_ring();
        }
    }

    /// No-op when only one ring is left
    pub fn remove_ring(&mut self, index: usize) {
        if self.require_phase(GamePhase::Idle, "remove ring") && !self.config.remove_ring(index) {
            log::debug!("ring {} not removed ({} rings)", index, self.config.rings.len());
        }
    }

    pub fn set_throw_params(&mut self, angle: f32, power: f32) {
        if self.require_phase(GamePhase::Idle, "aim change") {
            self.config.angle = angle;
            self.config.power = power;
        }
    }

    // === Phase transitions ===

    /// Launch a pin for the active player. Returns its ID, or `None` when
    /// not idle.
    pub fn throw_pin(&mut self) -> Option<u32> {
        if !self.require_phase(GamePhase::Idle, "throw") {
            return None;
        }

        while !self.pins.is_empty() && self.pins.len() >= self.config.board_capacity {
            let evicted = self.pins.remove(0);
            log::debug!("board full, evicted pin {}", evicted.id);
        }

        let id = self.next_entity_id();
        let pin = Pin::launched(
            id,
            self.active_player,
            self.config.launch_point(),
            self.config.launch_velocity(),
        );
        self.pins.push(pin);

        self.turn += 1;
        self.runtime = Some(ThrowRuntime::new(id));
        self.phase = GamePhase::Simulating;
        log::info!(
            "turn {}: player {} throws pin {} (angle {:.1}, power {:.2}, pitch {:.1})",
            self.turn,
            self.active_player,
            id,
            self.config.angle,
            self.config.power,
            self.config.pitch
        );
        Some(id)
    }

    /// Advance every moving pin one step and handle the resulting contacts.
    /// Returns whether anything is still moving; when nothing is, the phase
    /// moves on to resolving.
    pub fn advance_simulation_step(&mut self) -> bool {
        if !self.require_phase(GamePhase::Simulating, "step") {
            return false;
        }

        self.time_ticks += 1;
        for pin in &mut self.pins {
            integrate(pin, &self.config);
        }

        let contacts = resolve_collisions(&mut self.pins, &self.config);
        if let Some(runtime) = self.runtime.as_mut() {
            judge_thrown_contacts(&mut self.pins, &contacts, runtime, &self.config, &mut self.rng);
        }

        if self.pins.iter().any(|p| p.moving) {
            return true;
        }

        self.phase = GamePhase::Resolving;
        log::debug!("all pins settled after tick {}", self.time_ticks);
        false
    }

    /// Score the settled throw and end the turn
    pub fn resolve_throw(&mut self) {
        if !self.require_phase(GamePhase::Resolving, "resolve") {
            return;
        }

        let resolution = self
            .runtime
            .take()
            .and_then(|runtime| scoring::resolve_throw(&mut self.pins, &runtime, &self.config, &mut self.rng));

        match resolution {
            Some(res) => {
                for (player, delta) in self.players.iter_mut().zip(res.deltas) {
                    player.score += delta;
                }
                let id = self.next_entity_id();
                log::info!("{}", res.description);
                self.log.push(EventLogEntry {
                    id,
                    description: res.description,
                    deltas: res.deltas,
                    turn: self.turn,
                    tick: self.time_ticks,
                });
            }
            None => log::warn!("thrown pin missing at resolution; skipping scoring"),
        }

        self.phase = GamePhase::TurnEnd;
    }

    /// Hand the next throw to the other player
    pub fn next_turn(&mut self) {
        if !self.require_phase(GamePhase::TurnEnd, "next turn") {
            return;
        }
        self.active_player = opponent(self.active_player);
        self.runtime = None;
        self.phase = GamePhase::Idle;
        log::info!("player {} to throw", self.active_player);
    }

    /// Clear the board, scores and log and reseed the RNG from the config.
    /// Always accepted, even mid-throw.
    pub fn reset(&mut self) {
        let config = std::mem::take(&mut self.config);
        *self = GameState::new(config);
        log::info!("game reset (seed {})", self.config.seed);
    }

    /// Throw, step until settled (at most `max_steps`), then resolve.
    ///
    /// Returns the number of steps the throw took. `None` if the throw was
    /// rejected or pins were still moving after `max_steps`; in the latter
    /// case the game stays in the simulating phase.
    pub fn run_throw(&mut self, max_steps: u32) -> Option<u32> {
        self.throw_pin()?;
        for steps in 1..=max_steps {
            if !self.advance_simulation_step() {
                self.resolve_throw();
                return Some(steps);
            }
        }
        log::warn!("pins still moving after {} steps; throw left unresolved", max_steps);
        None
    }
}
