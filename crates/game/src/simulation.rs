//! Game simulation - the main game loop.
//!
//! This module contains the deterministic simulation that steps every
//! character once per fixed tick. Past ticks are kept in a bounded history
//! so they can be re-run with corrected inputs.

use std::collections::VecDeque;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vaultrun_physics::{
    CharacterController, ColliderId, CollisionProbe, LayerMask, MovementEvents, MovementParameters, MovementState,
    ParamsError, ProbeBuffer,
};

use crate::character::{Character, CharacterId, BODY_RADIUS};
use crate::input::PlayerInput;
use crate::level::Level;
use crate::snapshot::{self, SnapshotError, WorldSnapshot};

/// Errors from building a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("simulation config: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("invalid movement parameters: {0}")]
    Params(#[from] ParamsError),

    #[error("tick rate must be positive")]
    ZeroTickRate,

    #[error("history must hold at least one tick")]
    ZeroHistory,

    #[error("mouse sensitivity must be finite, got {0}")]
    InvalidSensitivity(f32),
}

/// Errors from [`Simulation::rollback_and_resimulate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RollbackError {
    #[error("tick {tick} is ahead of the simulation (now at {current})")]
    FutureTick { tick: u64, current: u64 },

    #[error("tick {tick} is no longer in history (oldest is {oldest:?})")]
    NotInHistory { tick: u64, oldest: Option<u64> },
}

/// Game simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation tick rate (ticks per second).
    pub tick_rate: u32,

    /// Movement parameters shared by every character.
    pub movement: MovementParameters,

    /// Mouse sensitivity in degrees per pixel.
    pub mouse_sensitivity: f32,

    /// Number of past ticks kept for rollback.
    pub history_length: usize,

    /// Ticks a dead character waits before respawning.
    pub respawn_delay_ticks: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 50,
            movement: MovementParameters::default(),
            mouse_sensitivity: 0.1,
            history_length: 120,
            respawn_delay_ticks: 150,
        }
    }
}

impl SimulationConfig {
    /// Get the time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    /// Decode a config from TOML and validate it.
    ///
    /// Missing fields take their default values.
    pub fn from_toml_str(source: &str) -> Result<Self, SimulationError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.tick_rate == 0 {
            return Err(SimulationError::ZeroTickRate);
        }
        if self.history_length == 0 {
            return Err(SimulationError::ZeroHistory);
        }
        if !self.mouse_sensitivity.is_finite() {
            return Err(SimulationError::InvalidSensitivity(self.mouse_sensitivity));
        }
        self.movement.validate()?;
        Ok(())
    }
}

/// Receives per-tick movement transitions.
///
/// Each tick is reported once. Ticks re-run during rollback are not
/// reported again.
pub trait MovementListener {
    fn on_movement_events(&mut self, tick: u64, character: CharacterId, events: MovementEvents);

    /// Called when a dead character comes back.
    fn on_respawn(&mut self, _tick: u64, _character: CharacterId) {}
}

/// A change made to a character from outside the tick loop.
///
/// Queued and applied at the start of the next tick, so rollback replays it.
#[derive(Debug, Clone, Copy, PartialEq)]
enum CharacterCommand {
    Kill(CharacterId),
    KnockBack(CharacterId, Vec3),
}

/// One recorded tick: the state before it ran, the inputs it ran with and
/// the commands queued ahead of it.
#[derive(Debug, Clone)]
struct TickRecord {
    snapshot: WorldSnapshot,
    inputs: Vec<PlayerInput>,
    commands: Vec<CharacterCommand>,
}

/// Something a tick reports to listeners.
#[derive(Debug, Clone, Copy)]
enum Notice {
    Movement(CharacterId, MovementEvents),
    Respawn(CharacterId),
}

/// The main game simulation.
///
/// This contains all game state and advances it deterministically based on
/// character inputs. Every client running the same inputs from the same
/// snapshot gets the same result.
pub struct Simulation {
    /// Number of ticks run so far.
    tick: u64,

    /// Simulation configuration.
    config: SimulationConfig,

    /// Current level.
    pub level: Level,

    /// All characters, in id order.
    characters: Vec<Character>,

    /// Movement controller.
    controller: CharacterController,

    /// Next character ID to assign.
    next_character_id: CharacterId,

    /// Recorded ticks, oldest first.
    history: VecDeque<TickRecord>,

    /// Commands for the next tick.
    pending: Vec<CharacterCommand>,

    /// Ticks below this have been reported to listeners.
    reported_until: u64,

    listeners: Vec<Box<dyn MovementListener>>,

    /// Scratch storage for probes.
    probe_buffer: ProbeBuffer,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.tick)
            .field("level", &self.level.id)
            .field("characters", &self.characters.len())
            .field("history", &self.history.len())
            .field("pending", &self.pending.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Simulation {
    /// Create a new simulation with the given configuration and level.
    pub fn new(config: SimulationConfig, level: Level) -> Result<Self, SimulationError> {
        config.validate()?;
        let controller = CharacterController::new(config.movement.clone())?;
        Ok(Self::with_controller(config, level, controller))
    }

    /// Create a simulation with default configuration and test arena.
    pub fn with_test_arena() -> Self {
        Self::with_controller(
            SimulationConfig::default(),
            Level::test_arena(),
            CharacterController::with_default_params(),
        )
    }

    fn with_controller(config: SimulationConfig, level: Level, controller: CharacterController) -> Self {
        let history = VecDeque::with_capacity(config.history_length);
        Self {
            tick: 0,
            config,
            level,
            characters: Vec::new(),
            controller,
            next_character_id: 1,
            history,
            pending: Vec::new(),
            reported_until: 0,
            listeners: Vec::new(),
            probe_buffer: ProbeBuffer::default(),
        }
    }

    /// Get the current tick number.
    #[inline]
    pub fn tick_number(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Get the delta time for this simulation.
    pub fn delta_time(&self) -> f32 {
        self.config.delta_time()
    }

    /// All characters, in id order.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Register a listener for movement transitions.
    pub fn subscribe(&mut self, listener: Box<dyn MovementListener>) {
        self.listeners.push(listener);
    }

    /// Add a character at the next spawn point.
    ///
    /// Returns the character's ID.
    pub fn add_character(&mut self, name: &str) -> CharacterId {
        let id = self.next_character_id;
        self.next_character_id += 1;

        let movement = self.spawn_state(id, None);
        let collider = self.level.collision.add_capsule(
            movement.position,
            BODY_RADIUS,
            self.config.movement.half_height,
            LayerMask::CHARACTER | LayerMask::CHARACTER_CLIP,
        );

        log::info!("character {id} '{name}' spawned at {}", movement.position);
        self.characters.push(Character::new(id, name.to_string(), movement, collider));
        id
    }

    /// Remove a character from the simulation.
    pub fn remove_character(&mut self, id: CharacterId) {
        if let Some(index) = self.characters.iter().position(|c| c.id == id) {
            let character = self.characters.remove(index);
            self.level.collision.remove(character.collider);
        }
    }

    /// Get a character by ID.
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Kill a character on the next tick. It respawns after the configured
    /// delay.
    pub fn kill(&mut self, id: CharacterId) {
        self.pending.push(CharacterCommand::Kill(id));
    }

    /// Apply an external impulse to a character on the next tick.
    pub fn knock_back(&mut self, id: CharacterId, velocity: Vec3) {
        self.pending.push(CharacterCommand::KnockBack(id, velocity));
    }

    /// Advance the simulation by one tick.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Inputs indexed by character position in [`Self::characters`].
    ///   Missing inputs count as no input.
    pub fn tick(&mut self, inputs: &[PlayerInput]) {
        if self.history.len() == self.config.history_length {
            self.history.pop_front();
        }
        let snapshot = self.snapshot();
        let commands = std::mem::take(&mut self.pending);
        self.advance(inputs, &commands);

        self.history.push_back(TickRecord {
            snapshot,
            inputs: inputs.to_vec(),
            commands,
        });
    }

    /// Rewind to `from_tick` and run forward again to the current tick.
    ///
    /// `corrected_inputs[i]` replaces the recorded inputs of tick
    /// `from_tick + i`; later ticks keep their recorded inputs. Kills and
    /// knock backs queued ahead of re-run ticks are replayed. Listeners are
    /// not told about re-run ticks.
    pub fn rollback_and_resimulate(
        &mut self,
        from_tick: u64,
        corrected_inputs: &[Vec<PlayerInput>],
    ) -> Result<(), RollbackError> {
        if from_tick > self.tick {
            return Err(RollbackError::FutureTick {
                tick: from_tick,
                current: self.tick,
            });
        }
        if from_tick == self.tick {
            return Ok(());
        }

        let oldest = self.history.front().map(|r| r.snapshot.tick);
        let start = match oldest {
            Some(oldest) if from_tick >= oldest => (from_tick - oldest) as usize,
            _ => {
                return Err(RollbackError::NotInHistory { tick: from_tick, oldest });
            }
        };

        for (record, corrected) in self.history.iter_mut().skip(start).zip(corrected_inputs) {
            record.inputs.clone_from(corrected);
        }
        if corrected_inputs.len() > self.history.len() - start {
            log::warn!(
                "ignoring {} corrected ticks past tick {}",
                corrected_inputs.len() - (self.history.len() - start),
                self.tick
            );
        }

        let target = self.tick;
        log::debug!("rollback from tick {target} to {from_tick}");
        self.restore(self.history[start].snapshot.clone());

        for index in start..self.history.len() {
            self.history[index].snapshot = self.snapshot();
            let inputs = std::mem::take(&mut self.history[index].inputs);
            let commands = std::mem::take(&mut self.history[index].commands);
            self.advance(&inputs, &commands);
            self.history[index].inputs = inputs;
            self.history[index].commands = commands;
        }

        debug_assert_eq!(self.tick, target);
        Ok(())
    }

    /// Capture the current state.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            characters: self.characters.clone(),
        }
    }

    /// Serialize the current state for rollback/sync.
    pub fn serialize_state(&self) -> Result<Vec<u8>, SnapshotError> {
        snapshot::encode(&self.snapshot())
    }

    /// Deserialize and restore state.
    ///
    /// History and queued commands are cleared, since they no longer lead
    /// to the restored state.
    pub fn deserialize_state(&mut self, data: &[u8]) -> Result<(), SnapshotError> {
        let snapshot = snapshot::decode(data)?;
        self.history.clear();
        self.pending.clear();
        self.restore(snapshot);
        Ok(())
    }

    /// Replace characters and tick with a snapshot, and move the body
    /// colliders to match.
    fn restore(&mut self, snapshot: WorldSnapshot) {
        for old in &self.characters {
            if !snapshot.characters.iter().any(|c| c.collider == old.collider) {
                self.level.collision.remove(old.collider);
            }
        }

        self.tick = snapshot.tick;
        self.characters = snapshot.characters;
        self.next_character_id = self
            .characters
            .iter()
            .map(|c| c.id + 1)
            .max()
            .unwrap_or(1)
            .max(self.next_character_id);

        for character in &mut self.characters {
            let position = character.position();
            if !self.level.collision.set_collider_position(character.collider, position) {
                character.collider = self.level.collision.add_capsule(
                    position,
                    BODY_RADIUS,
                    self.config.movement.half_height,
                    LayerMask::CHARACTER | LayerMask::CHARACTER_CLIP,
                );
            }
        }
    }

    /// Movement state for a character placed at its spawn point.
    fn spawn_state(&mut self, id: CharacterId, ignore: Option<ColliderId>) -> MovementState {
        let Some(spawn) = self.level.spawn_point(id as usize - 1).copied() else {
            log::warn!("level '{}' has no spawn points", self.level.id);
            return MovementState::new(Vec3::ZERO);
        };

        let mut probe = CollisionProbe::new(&self.level.collision, &mut self.probe_buffer);
        if let Some(collider) = ignore {
            probe = probe.ignoring(collider);
        }
        let mut movement = self.controller.spawn_at(spawn.position, &mut probe);
        movement.yaw = spawn.yaw;
        movement
    }

    /// Apply queued commands in the order they were issued.
    fn apply_commands(&mut self, commands: &[CharacterCommand]) {
        for command in commands {
            let (CharacterCommand::Kill(id) | CharacterCommand::KnockBack(id, _)) = *command;
            let Some(character) = self.characters.iter_mut().find(|c| c.id == id) else {
                log::debug!("dropping {command:?} for missing character");
                continue;
            };
            match *command {
                CharacterCommand::Kill(_) => character.kill(self.config.respawn_delay_ticks),
                CharacterCommand::KnockBack(_, velocity) if character.is_alive() => {
                    self.controller.apply_knock_back(&mut character.movement, velocity);
                }
                CharacterCommand::KnockBack(..) => {}
            }
        }
    }

    /// Run one tick without recording it.
    fn advance(&mut self, inputs: &[PlayerInput], commands: &[CharacterCommand]) {
        let dt = self.config.delta_time();
        let mut notices = Vec::new();

        self.apply_commands(commands);

        for index in 0..self.characters.len() {
            let (id, collider) = {
                let character = &self.characters[index];
                (character.id, character.collider)
            };

            if !self.characters[index].is_alive() {
                if self.characters[index].tick_respawn() {
                    let movement = self.spawn_state(id, Some(collider));
                    log::info!("character {id} respawned at {}", movement.position);
                    self.characters[index].respawn(movement);
                    self.level.collision.set_collider_position(collider, self.characters[index].position());
                    notices.push(Notice::Respawn(id));
                }
                continue;
            }

            let command = inputs
                .get(index)
                .map(|input| input.to_command(self.config.mouse_sensitivity))
                .unwrap_or_default();

            let character = &mut self.characters[index];
            let mut probe = CollisionProbe::new(&self.level.collision, &mut self.probe_buffer).ignoring(collider);
            let events = self.controller.step(&mut character.movement, &command, &mut probe, dt);

            let position = character.position();
            self.level.collision.set_collider_position(collider, position);

            if self.level.is_out_of_bounds(position) {
                log::info!("character {id} fell out of the level at {position}");
                character.kill(self.config.respawn_delay_ticks);
            }

            if !events.is_empty() {
                notices.push(Notice::Movement(id, events));
            }
        }

        let tick = self.tick;
        self.tick += 1;

        if tick >= self.reported_until {
            self.reported_until = self.tick;
            for notice in notices {
                for listener in &mut self.listeners {
                    match notice {
                        Notice::Movement(id, events) => listener.on_movement_events(tick, id, events),
                        Notice::Respawn(id) => listener.on_respawn(tick, id),
                    }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(u64, CharacterId, MovementEvents)>>>;

    struct Recorder(Log);

    impl MovementListener for Recorder {
        fn on_movement_events(&mut self, tick: u64, character: CharacterId, events: MovementEvents) {
            self.0.borrow_mut().push((tick, character, events));
        }
    }

    fn jump_input() -> PlayerInput {
        let mut input = PlayerInput::forward();
        input.actions.jump = true;
        input
    }

    #[test]
    fn test_simulation_creation() {
        let sim = Simulation::with_test_arena();
        assert_eq!(sim.tick_number(), 0);
        assert!(sim.characters().is_empty());
        assert_eq!(sim.delta_time(), 0.02);
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = SimulationConfig {
            tick_rate: 0,
            ..Default::default()
        };
        assert!(matches!(
            Simulation::new(config, Level::test_arena()),
            Err(SimulationError::ZeroTickRate)
        ));

        let mut config = SimulationConfig::default();
        config.movement.gravity = f32::NAN;
        assert!(matches!(
            Simulation::new(config, Level::test_arena()),
            Err(SimulationError::Params(_))
        ));
    }

    #[test]
    fn test_config_from_toml() {
        let config = SimulationConfig::from_toml_str(
            r#"
            tick_rate = 60
            mouse_sensitivity = 0.25

            [movement]
            move_speed = 15.0
            "#,
        )
        .unwrap();
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.movement.move_speed, 15.0);
        assert_eq!(config.movement.gravity, MovementParameters::default().gravity);
        assert_eq!(config.history_length, 120);

        assert!(SimulationConfig::from_toml_str("history_length = 0").is_err());
    }

    #[test]
    fn test_add_character() {
        let mut sim = Simulation::with_test_arena();

        let first = sim.add_character("First");
        let second = sim.add_character("Second");
        assert_eq!((first, second), (1, 2));

        let character = sim.character(first).unwrap();
        assert_eq!(character.name, "First");
        assert!(character.is_alive());
        assert!(character.movement.grounded());
        assert!((character.position() - Vec3::new(-20.0, 1.0, 0.0)).length() < 1e-4);
        assert_eq!(character.movement.yaw, 90.0);

        assert_eq!(sim.character(second).unwrap().movement.yaw, 270.0);
    }

    #[test]
    fn test_remove_character_drops_collider() {
        let mut sim = Simulation::with_test_arena();
        let before = sim.level.collision.collider_count();

        let id = sim.add_character("Test");
        assert_eq!(sim.level.collision.collider_count(), before + 1);

        sim.remove_character(id);
        assert!(sim.character(id).is_none());
        assert_eq!(sim.level.collision.collider_count(), before);
    }

    #[test]
    fn test_tick_advances() {
        let mut sim = Simulation::with_test_arena();
        sim.add_character("Test");

        sim.tick(&[PlayerInput::default()]);
        assert_eq!(sim.tick_number(), 1);

        sim.tick(&[]);
        assert_eq!(sim.tick_number(), 2);
    }

    #[test]
    fn test_movement_input() {
        let mut sim = Simulation::with_test_arena();
        let id = sim.add_character("Test");
        let start = sim.character(id).unwrap().position();

        for _ in 0..50 {
            sim.tick(&[PlayerInput::forward()]);
        }

        // Spawned facing +X
        let character = sim.character(id).unwrap();
        let moved = character.position() - start;
        assert!(moved.x > 10.0, "moved {moved}");
        assert!(moved.z.abs() < 1e-3);
        assert!(character.movement.grounded());

        // Body collider follows the character
        let collider = sim.level.collision.collider(character.collider).unwrap();
        assert!((collider.transform.translation.vector.x - character.position().x).abs() < 1e-4);
    }

    #[test]
    fn test_history_is_bounded() {
        let config = SimulationConfig {
            history_length: 8,
            ..Default::default()
        };
        let mut sim = Simulation::new(config, Level::test_arena()).unwrap();
        sim.add_character("Test");

        for _ in 0..20 {
            sim.tick(&[PlayerInput::forward()]);
        }

        assert_eq!(
            sim.rollback_and_resimulate(5, &[]),
            Err(RollbackError::NotInHistory {
                tick: 5,
                oldest: Some(12)
            })
        );
        assert_eq!(
            sim.rollback_and_resimulate(21, &[]),
            Err(RollbackError::FutureTick { tick: 21, current: 20 })
        );
        assert!(sim.rollback_and_resimulate(12, &[]).is_ok());
    }

    #[test]
    fn test_rollback_without_corrections_is_identical() {
        let mut sim = Simulation::with_test_arena();
        sim.add_character("A");
        sim.add_character("B");

        for i in 0..60 {
            let b = if i % 20 < 3 { jump_input() } else { PlayerInput::forward() };
            sim.tick(&[PlayerInput::forward(), b]);
        }
        let before = sim.serialize_state().unwrap();

        sim.rollback_and_resimulate(10, &[]).unwrap();
        assert_eq!(sim.tick_number(), 60);
        assert_eq!(sim.serialize_state().unwrap(), before);
    }

    #[test]
    fn test_rollback_with_corrected_inputs() {
        let inputs: Vec<PlayerInput> = (0..40)
            .map(|i| if i == 15 { jump_input() } else { PlayerInput::forward() })
            .collect();

        // Authoritative run with the jump
        let mut reference = Simulation::with_test_arena();
        reference.add_character("Test");
        for input in &inputs {
            reference.tick(&[*input]);
        }

        // Predicted run without it, corrected afterwards
        let mut predicted = Simulation::with_test_arena();
        predicted.add_character("Test");
        for _ in 0..40 {
            predicted.tick(&[PlayerInput::forward()]);
        }
        assert_ne!(predicted.serialize_state().unwrap(), reference.serialize_state().unwrap());

        let corrections: Vec<Vec<PlayerInput>> = inputs[15..20].iter().map(|i| vec![*i]).collect();
        predicted.rollback_and_resimulate(15, &corrections).unwrap();

        assert_eq!(predicted.serialize_state().unwrap(), reference.serialize_state().unwrap());
    }

    #[test]
    fn test_listeners_not_told_twice() {
        let log: Log = Rc::default();
        let mut sim = Simulation::with_test_arena();
        sim.subscribe(Box::new(Recorder(log.clone())));
        let id = sim.add_character("Test");

        for i in 0..60 {
            let input = if i == 0 { jump_input() } else { PlayerInput::default() };
            sim.tick(&[input]);
        }

        let reported = log.borrow().clone();
        assert!(reported
            .iter()
            .any(|&(tick, who, events)| tick == 0 && who == id && events.has(MovementEvents::JUMPED)));
        assert!(reported.iter().any(|(_, _, events)| events.has(MovementEvents::LANDED)));

        sim.rollback_and_resimulate(0, &[]).unwrap();
        assert_eq!(*log.borrow(), reported);

        // New ticks are reported again
        sim.tick(&[jump_input()]);
        assert!(log.borrow().iter().any(|&(tick, _, _)| tick == 60));
    }

    #[test]
    fn test_state_roundtrip() {
        let mut sim = Simulation::with_test_arena();
        sim.add_character("Test");
        for _ in 0..25 {
            sim.tick(&[jump_input()]);
        }
        let saved = sim.serialize_state().unwrap();
        let position = sim.characters()[0].position();

        for _ in 0..25 {
            sim.tick(&[PlayerInput::forward()]);
        }
        sim.deserialize_state(&saved).unwrap();

        assert_eq!(sim.tick_number(), 25);
        assert_eq!(sim.characters()[0].position(), position);
        assert_eq!(sim.serialize_state().unwrap(), saved);
    }

    #[test]
    fn test_knock_back() {
        let mut sim = Simulation::with_test_arena();
        let id = sim.add_character("Test");

        sim.knock_back(id, Vec3::new(0.0, 12.0, 0.0));
        sim.tick(&[]);

        let character = sim.character(id).unwrap();
        assert!(!character.movement.grounded());
        assert!(character.position().y > 1.0);
    }

    #[test]
    fn test_rollback_replays_knock_back() {
        let mut sim = Simulation::with_test_arena();
        let id = sim.add_character("Test");

        for _ in 0..5 {
            sim.tick(&[]);
        }
        sim.knock_back(id, Vec3::new(0.0, 15.0, 10.0));
        for _ in 0..5 {
            sim.tick(&[]);
        }
        let before = sim.serialize_state().unwrap();
        assert!(sim.character(id).unwrap().position().y > 1.5);

        sim.rollback_and_resimulate(2, &[]).unwrap();
        assert_eq!(sim.serialize_state().unwrap(), before);
    }

    #[test]
    fn test_rollback_replays_kill() {
        let mut sim = Simulation::with_test_arena();
        let id = sim.add_character("Test");

        for _ in 0..5 {
            sim.tick(&[]);
        }
        sim.kill(id);
        assert!(sim.character(id).unwrap().is_alive());
        for _ in 0..5 {
            sim.tick(&[]);
        }
        assert!(!sim.character(id).unwrap().is_alive());
        let before = sim.serialize_state().unwrap();

        sim.rollback_and_resimulate(2, &[]).unwrap();
        let character = sim.character(id).unwrap();
        assert!(!character.is_alive());
        assert_eq!(character.deaths, 1);
        assert_eq!(sim.serialize_state().unwrap(), before);
    }

    #[test]
    fn test_fall_out_and_respawn() {
        let config = SimulationConfig {
            respawn_delay_ticks: 3,
            ..Default::default()
        };
        let mut level = Level::new("ledge", "Ledge");
        level.collision.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(5.0, 0.5, 5.0),
            LayerMask::WORLD,
            vaultrun_physics::SurfaceTag::Level,
        );
        level.spawn_points.push(crate::level::SpawnPoint {
            position: Vec3::ZERO,
            yaw: 0.0,
        });
        level.kill_height = -5.0;
        let mut sim = Simulation::new(config, level).unwrap();
        let id = sim.add_character("Test");

        // Run off the edge
        let mut died = false;
        for _ in 0..200 {
            sim.tick(&[PlayerInput::forward()]);
            if !sim.character(id).unwrap().is_alive() {
                died = true;
                break;
            }
        }
        assert!(died);

        // Character is not simulated while dead
        let corpse = sim.character(id).unwrap().position();
        assert!(corpse.y < -5.0);
        sim.tick(&[PlayerInput::forward()]);
        sim.tick(&[PlayerInput::forward()]);
        assert_eq!(sim.character(id).unwrap().position(), corpse);

        sim.tick(&[]);
        let character = sim.character(id).unwrap();
        assert!(character.is_alive());
        assert_eq!(character.deaths, 1);
        assert!((character.position() - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-4);
        assert!(character.movement.grounded());
    }

    #[test]
    fn test_determinism() {
        let inputs: Vec<_> = (0..200)
            .map(|i| {
                let mut input = PlayerInput::default();
                input.movement.forward = i % 2 == 0;
                input.movement.right = i % 3 == 0;
                input.actions.jump = i % 10 == 0;
                input.mouse_delta = ((i % 11) as f32 - 5.0, 0.0);
                input
            })
            .collect();

        let run = || {
            let mut sim = Simulation::with_test_arena();
            sim.add_character("A");
            sim.add_character("B");
            for input in &inputs {
                sim.tick(&[*input, *input]);
            }
            sim.serialize_state().unwrap()
        };

        assert_eq!(run(), run());
    }
}
