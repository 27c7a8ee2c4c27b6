//! Player input handling.
//!
//! This module converts raw input (keys and mouse) into commands for the
//! movement core.

use serde::{Deserialize, Serialize};
use vaultrun_physics::movement::{CommandButtons, InputCommand};

/// Raw player input for a single tick.
///
/// This is the input format received from the client input system.
/// It gets converted to [`InputCommand`] for the movement core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement keys held.
    pub movement: MovementInput,

    /// Mouse delta this tick (pixels). Only the horizontal part turns the
    /// character; there is no pitch.
    pub mouse_delta: (f32, f32),

    /// Action buttons.
    pub actions: ActionInput,
}

/// Movement key states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Action button states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInput {
    /// Held.
    pub jump: bool,
    /// Pressed this tick. Each press toggles crouch.
    pub crouch: bool,
}

impl PlayerInput {
    /// Convert to a movement command.
    ///
    /// # Arguments
    ///
    /// * `mouse_sensitivity` - Degrees of yaw per pixel of horizontal mouse motion
    pub fn to_command(&self, mouse_sensitivity: f32) -> InputCommand {
        let mut buttons = CommandButtons::default();

        if self.movement.forward {
            buttons.press(CommandButtons::FORWARD);
        }
        if self.movement.backward {
            buttons.press(CommandButtons::BACK);
        }
        if self.movement.left {
            buttons.press(CommandButtons::LEFT);
        }
        if self.movement.right {
            buttons.press(CommandButtons::RIGHT);
        }
        if self.actions.jump {
            buttons.press(CommandButtons::JUMP);
        }
        if self.actions.crouch {
            buttons.press(CommandButtons::CROUCH);
        }

        // Moving the mouse right turns right (increases yaw)
        InputCommand {
            buttons,
            aim_yaw_delta: self.mouse_delta.0 * mouse_sensitivity,
        }
    }

    /// Check if any movement key is held.
    pub fn has_movement(&self) -> bool {
        self.movement.forward || self.movement.backward || self.movement.left || self.movement.right
    }

    /// Forward held, nothing else.
    pub fn forward() -> Self {
        Self {
            movement: MovementInput {
                forward: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_to_command() {
        let mut input = PlayerInput::default();
        input.movement.forward = true;
        input.movement.right = true;
        input.actions.jump = true;

        let cmd = input.to_command(0.1);

        assert!(cmd.buttons.pressed(CommandButtons::FORWARD));
        assert!(cmd.buttons.pressed(CommandButtons::RIGHT));
        assert!(cmd.buttons.pressed(CommandButtons::JUMP));
        assert!(!cmd.buttons.pressed(CommandButtons::CROUCH));
        assert_eq!(cmd.aim_yaw_delta, 0.0);
    }

    #[test]
    fn test_mouse_sensitivity_is_degrees_per_pixel() {
        let input = PlayerInput {
            mouse_delta: (30.0, -12.0),
            ..Default::default()
        };

        let cmd = input.to_command(0.5);
        assert_eq!(cmd.aim_yaw_delta, 15.0);
    }

    #[test]
    fn test_has_movement() {
        assert!(!PlayerInput::default().has_movement());
        assert!(PlayerInput::forward().has_movement());

        let mut jump_only = PlayerInput::default();
        jump_only.actions.jump = true;
        assert!(!jump_only.has_movement());
    }
}
