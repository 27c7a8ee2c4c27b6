//! Jump queuing and crouch toggling.
//!
//! A jump is queued while the button is held and executes on the next ground
//! move. The queue is edge-free: holding the button re-queues every tick, so
//! holding through a landing jumps again exactly once per landing.

use super::state::{InputCommand, MovementFlags, MovementState};

/// Queue or cancel a jump from this tick's input.
///
/// Pressing jump while crouched stands up instead of queueing.
pub fn queue_jump(state: &mut MovementState, input: &InputCommand) {
    let flags = &mut state.flags;
    if !input.wants_jump() {
        flags.set(MovementFlags::WISH_JUMP, false);
        return;
    }

    if flags.crouched() {
        flags.set(MovementFlags::CROUCHED, false);
        flags.set(MovementFlags::WISH_JUMP, false);
        return;
    }

    flags.set(MovementFlags::WISH_JUMP, true);
}

/// Toggle crouch. Only grounded characters can crouch.
pub fn toggle_crouch(state: &mut MovementState, input: &InputCommand) {
    let flags = &mut state.flags;
    if !flags.grounded() {
        flags.set(MovementFlags::CROUCHED, false);
        return;
    }

    if input.wants_crouch() {
        let crouched = flags.crouched();
        flags.set(MovementFlags::CROUCHED, !crouched);
    }
}

/// Execute a queued jump. Called from the ground move after vertical
/// velocity has been reset.
///
/// Returns whether a jump happened.
pub fn try_execute(state: &mut MovementState, jump_speed: f32) -> bool {
    let flags = state.flags;
    if !flags.wish_jump() || flags.hit_ceiling() {
        return false;
    }

    state.velocity.y = jump_speed;
    state.flags.set(MovementFlags::JUMPING, true);
    state.flags.set(MovementFlags::DOUBLE_JUMPING, false);
    state.flags.set(MovementFlags::WISH_JUMP, false);
    state.flags.set(MovementFlags::GROUNDED, false);
    true
}

/// Whether a regular ground contact should be ignored because the character
/// is still rising from its own jump.
#[inline]
pub fn ascending_from_jump(state: &MovementState) -> bool {
    state.flags.jumping() && state.velocity.y > 0.0
}
