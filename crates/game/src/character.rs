//! Character entity and state.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use vaultrun_physics::{ColliderId, MovementState};

/// Unique identifier for characters.
pub type CharacterId = u32;

/// Capsule radius of a character body.
pub const BODY_RADIUS: f32 = 0.5;

/// A character in the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Unique character ID.
    pub id: CharacterId,

    /// Display name.
    pub name: String,

    /// Movement state.
    pub movement: MovementState,

    /// Body collider in the level's collision world.
    pub collider: ColliderId,

    alive: bool,

    /// Ticks left before respawning. Zero while alive.
    respawn_ticks: u32,

    /// Deaths this session.
    pub deaths: u32,
}

impl Character {
    /// Create a live character.
    pub fn new(id: CharacterId, name: String, movement: MovementState, collider: ColliderId) -> Self {
        Self {
            id,
            name,
            movement,
            collider,
            alive: true,
            respawn_ticks: 0,
            deaths: 0,
        }
    }

    /// Get the character's current position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.movement.position
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Ticks left before respawning.
    #[inline]
    pub fn respawn_ticks(&self) -> u32 {
        self.respawn_ticks
    }

    /// Kill the character and start the respawn countdown.
    ///
    /// Has no effect on a character that is already dead.
    pub fn kill(&mut self, respawn_delay_ticks: u32) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.respawn_ticks = respawn_delay_ticks;
        self.deaths += 1;
    }

    /// Count down one tick. Returns `true` when the character is ready to
    /// respawn.
    pub fn tick_respawn(&mut self) -> bool {
        if self.alive {
            return false;
        }
        self.respawn_ticks = self.respawn_ticks.saturating_sub(1);
        self.respawn_ticks == 0
    }

    /// Bring the character back with a fresh movement state.
    pub fn respawn(&mut self, movement: MovementState) {
        self.movement = movement;
        self.alive = true;
        self.respawn_ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_creation() {
        let character = Character::new(1, "Test".to_string(), MovementState::new(Vec3::ZERO), 4);
        assert!(character.is_alive());
        assert_eq!(character.respawn_ticks(), 0);
        assert_eq!(character.collider, 4);
    }

    #[test]
    fn test_respawn_countdown() {
        let mut character = Character::new(1, "Test".to_string(), MovementState::new(Vec3::ZERO), 0);
        character.kill(3);
        assert!(!character.is_alive());
        assert_eq!(character.deaths, 1);

        // Killing a dead character does not restart the countdown
        character.kill(10);
        assert_eq!(character.respawn_ticks(), 3);
        assert_eq!(character.deaths, 1);

        assert!(!character.tick_respawn());
        assert!(!character.tick_respawn());
        assert!(character.tick_respawn());

        character.respawn(MovementState::new(Vec3::new(10.0, 1.0, 10.0)));
        assert!(character.is_alive());
        assert_eq!(character.position(), Vec3::new(10.0, 1.0, 10.0));
    }

    #[test]
    fn test_zero_delay_respawns_next_tick() {
        let mut character = Character::new(1, "Test".to_string(), MovementState::new(Vec3::ZERO), 0);
        character.kill(0);
        assert!(character.tick_respawn());
    }
}
