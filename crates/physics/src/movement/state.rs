//! Movement state and input structures.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{ColliderId, ProbeResult, SurfaceTag};
use crate::math::{yaw_forward, yaw_right};

/// Flags describing the character's current movement state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementFlags(pub u16);

impl MovementFlags {
    /// Standing on walkable ground.
    pub const GROUNDED: u16 = 1 << 0;

    /// The ground probe found a surface this tick (including ramps and pads).
    pub const FLOOR_DETECTED: u16 = 1 << 1;

    /// Crouched.
    pub const CROUCHED: u16 = 1 << 2;

    /// Airborne because of a jump.
    pub const JUMPING: u16 = 1 << 3;

    /// Second jump used in the air. Reset by every ground jump.
    pub const DOUBLE_JUMPING: u16 = 1 << 4;

    /// Launched by a speed ramp. Disables friction, input and the speed clamp.
    pub const SLIDING: u16 = 1 << 5;

    /// A surface boost is in effect.
    pub const BOOSTED: u16 = 1 << 6;

    /// Currently touching a wall bounce pad.
    pub const BOUNCE_PAD_WALL_ACTIVE: u16 = 1 << 7;

    /// Something is directly overhead.
    pub const HIT_CEILING: u16 = 1 << 8;

    /// Velocity was set externally; skip the ground probe until the next
    /// air move.
    pub const KNOCK_BACK_OVERRIDE: u16 = 1 << 9;

    /// Jump is queued.
    pub const WISH_JUMP: u16 = 1 << 10;

    /// Check if a flag is set.
    #[inline]
    pub fn has(self, flag: u16) -> bool {
        (self.0 & flag) != 0
    }

    /// Set or clear a flag.
    #[inline]
    pub fn set(&mut self, flag: u16, value: bool) {
        if value {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }

    #[inline]
    pub fn grounded(self) -> bool {
        self.has(Self::GROUNDED)
    }

    #[inline]
    pub fn floor_detected(self) -> bool {
        self.has(Self::FLOOR_DETECTED)
    }

    #[inline]
    pub fn crouched(self) -> bool {
        self.has(Self::CROUCHED)
    }

    #[inline]
    pub fn jumping(self) -> bool {
        self.has(Self::JUMPING)
    }

    #[inline]
    pub fn double_jumping(self) -> bool {
        self.has(Self::DOUBLE_JUMPING)
    }

    #[inline]
    pub fn sliding(self) -> bool {
        self.has(Self::SLIDING)
    }

    #[inline]
    pub fn boosted(self) -> bool {
        self.has(Self::BOOSTED)
    }

    #[inline]
    pub fn bounce_pad_wall_active(self) -> bool {
        self.has(Self::BOUNCE_PAD_WALL_ACTIVE)
    }

    #[inline]
    pub fn hit_ceiling(self) -> bool {
        self.has(Self::HIT_CEILING)
    }

    #[inline]
    pub fn knock_back_override(self) -> bool {
        self.has(Self::KNOCK_BACK_OVERRIDE)
    }

    #[inline]
    pub fn wish_jump(self) -> bool {
        self.has(Self::WISH_JUMP)
    }
}

/// Movement axes derived from held keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveCommand {
    /// -1 back, 0 none, 1 forward.
    pub forward_axis: i8,
    /// -1 left, 0 none, 1 right.
    pub right_axis: i8,
}

impl MoveCommand {
    /// Build axes from held keys. Forward wins over back and left wins over
    /// right when both are held.
    pub fn from_input(input: &InputCommand) -> Self {
        let buttons = input.buttons;
        let forward_axis = if buttons.pressed(CommandButtons::FORWARD) {
            1
        } else if buttons.pressed(CommandButtons::BACK) {
            -1
        } else {
            0
        };
        let right_axis = if buttons.pressed(CommandButtons::LEFT) {
            -1
        } else if buttons.pressed(CommandButtons::RIGHT) {
            1
        } else {
            0
        };
        Self {
            forward_axis,
            right_axis,
        }
    }

    /// Only strafing: no forward component, some right component.
    #[inline]
    pub fn is_pure_strafe(self) -> bool {
        self.forward_axis == 0 && self.right_axis != 0
    }

    #[inline]
    pub fn is_idle(self) -> bool {
        self.forward_axis == 0 && self.right_axis == 0
    }
}

/// Cached data from the most recent ground contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundHit {
    pub normal: Vec3,
    pub tag: SurfaceTag,
    pub point: Vec3,
    pub collider: ColliderId,
}

impl Default for GroundHit {
    fn default() -> Self {
        Self {
            normal: Vec3::Y,
            tag: SurfaceTag::None,
            point: Vec3::ZERO,
            collider: ColliderId::MAX,
        }
    }
}

impl From<&ProbeResult> for GroundHit {
    fn from(hit: &ProbeResult) -> Self {
        Self {
            normal: hit.normal,
            tag: hit.surface_tag,
            point: hit.point,
            collider: hit.collider,
        }
    }
}

/// Slope classification from the most recent ground query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum SlopeState {
    /// Nothing below within the slope search distance.
    #[default]
    None,
    /// Walkable slope; horizontal motion follows the plane.
    Traversable { normal: Vec3 },
    /// Nearest surface below is too steep; horizontal motion is dropped.
    TooSteep { normal: Vec3 },
}

impl SlopeState {
    /// Normal of the classified surface, if any.
    pub fn normal(self) -> Option<Vec3> {
        match self {
            Self::None => None,
            Self::Traversable { normal } | Self::TooSteep { normal } => Some(normal),
        }
    }
}

/// Complete movement state for a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementState {
    /// Character center in world space. The base sits half a height below.
    pub position: Vec3,

    /// Velocity in world space (units/second).
    pub velocity: Vec3,

    /// Accumulated yaw in degrees, wrapped to [0, 360).
    pub yaw: f32,

    pub flags: MovementFlags,

    /// Axes used by the last move. Frozen while sliding.
    pub move_command: MoveCommand,

    pub last_ground_hit: GroundHit,

    pub slope: SlopeState,
}

impl Default for MovementState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            flags: MovementFlags::default(),
            move_command: MoveCommand::default(),
            last_ground_hit: GroundHit::default(),
            slope: SlopeState::None,
        }
    }
}

impl MovementState {
    /// Create a new movement state at the given position.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Horizontal facing direction.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        yaw_forward(self.yaw)
    }

    /// Horizontal right direction.
    #[inline]
    pub fn right(&self) -> Vec3 {
        yaw_right(self.yaw)
    }

    /// Current horizontal speed.
    pub fn horizontal_speed(&self) -> f32 {
        Vec3::new(self.velocity.x, 0.0, self.velocity.z).length()
    }

    #[inline]
    pub fn grounded(&self) -> bool {
        self.flags.grounded()
    }

    #[inline]
    pub fn crouched(&self) -> bool {
        self.flags.crouched()
    }

    #[inline]
    pub fn jumping(&self) -> bool {
        self.flags.jumping()
    }
}

/// Input command from the player for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputCommand {
    pub buttons: CommandButtons,

    /// Yaw change this tick in degrees. Non-finite values are ignored.
    pub aim_yaw_delta: f32,
}

/// Button state flags for input commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandButtons(pub u8);

impl CommandButtons {
    pub const FORWARD: u8 = 1 << 0;
    pub const BACK: u8 = 1 << 1;
    pub const LEFT: u8 = 1 << 2;
    pub const RIGHT: u8 = 1 << 3;

    /// Jump held.
    pub const JUMP: u8 = 1 << 4;

    /// Crouch pressed this tick (edge, not level).
    pub const CROUCH: u8 = 1 << 5;

    /// Check if a button is pressed.
    #[inline]
    pub fn pressed(self, button: u8) -> bool {
        (self.0 & button) != 0
    }

    /// Press a button.
    #[inline]
    pub fn press(&mut self, button: u8) {
        self.0 |= button;
    }

    /// Release a button.
    #[inline]
    pub fn release(&mut self, button: u8) {
        self.0 &= !button;
    }
}

impl InputCommand {
    /// Command with the given buttons held and no aim change.
    pub fn with_buttons(buttons: u8) -> Self {
        Self {
            buttons: CommandButtons(buttons),
            aim_yaw_delta: 0.0,
        }
    }

    #[inline]
    pub fn wants_jump(&self) -> bool {
        self.buttons.pressed(CommandButtons::JUMP)
    }

    #[inline]
    pub fn wants_crouch(&self) -> bool {
        self.buttons.pressed(CommandButtons::CROUCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_flags() {
        let mut flags = MovementFlags::default();
        assert!(!flags.grounded());

        flags.set(MovementFlags::GROUNDED, true);
        flags.set(MovementFlags::WISH_JUMP, true);
        assert!(flags.grounded());
        assert!(flags.wish_jump());

        flags.set(MovementFlags::GROUNDED, false);
        assert!(!flags.grounded());
        assert!(flags.wish_jump());
    }

    #[test]
    fn test_move_command_priorities() {
        let input = InputCommand::with_buttons(
            CommandButtons::FORWARD | CommandButtons::BACK | CommandButtons::LEFT | CommandButtons::RIGHT,
        );
        let cmd = MoveCommand::from_input(&input);
        assert_eq!(cmd.forward_axis, 1);
        assert_eq!(cmd.right_axis, -1);

        let cmd = MoveCommand::from_input(&InputCommand::with_buttons(CommandButtons::RIGHT));
        assert_eq!(cmd, MoveCommand { forward_axis: 0, right_axis: 1 });
        assert!(cmd.is_pure_strafe());

        assert!(MoveCommand::from_input(&InputCommand::default()).is_idle());
    }

    #[test]
    fn test_state_directions() {
        let mut state = MovementState::new(Vec3::ZERO);

        let forward = state.forward();
        assert!((forward - Vec3::Z).length() < 0.01);

        state.yaw = 90.0;
        let forward = state.forward();
        let right = state.right();
        assert!((forward - Vec3::X).length() < 0.01);
        assert!((right - Vec3::NEG_Z).length() < 0.01);
    }

    #[test]
    fn test_slope_state_normal() {
        assert_eq!(SlopeState::None.normal(), None);
        assert_eq!(SlopeState::TooSteep { normal: Vec3::X }.normal(), Some(Vec3::X));
    }

    #[test]
    fn test_command_buttons() {
        let mut input = InputCommand::default();
        assert!(!input.wants_jump());

        input.buttons.press(CommandButtons::JUMP);
        assert!(input.wants_jump());

        input.buttons.release(CommandButtons::JUMP);
        assert!(!input.wants_jump());
    }
}
