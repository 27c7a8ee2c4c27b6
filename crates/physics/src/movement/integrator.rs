//! Ground and air solvers.
//!
//! Quake 3 CPM style movement: friction and capped acceleration on the
//! ground, asymmetric air acceleration with strafe override and air control
//! in the air. Acceleration only ever touches horizontal velocity.

use glam::Vec3;

use crate::collision::SurfaceTag;
use crate::math::{horizontal, project_on_plane};

use super::config::MovementParameters;
use super::jump;
use super::state::{MoveCommand, MovementFlags, MovementState, SlopeState};

/// Air control scale from CPM.
const AIR_CONTROL_SCALE: f32 = 32.0;

/// Runs the ground and air solvers for one character.
#[derive(Debug, Clone, Copy)]
pub struct MovementIntegrator<'a> {
    params: &'a MovementParameters,
}

impl<'a> MovementIntegrator<'a> {
    pub fn new(params: &'a MovementParameters) -> Self {
        Self { params }
    }

    // ========================================================================
    // Solvers
    // ========================================================================

    /// Ground move. Returns whether a queued jump was executed.
    pub fn ground_move(&self, state: &mut MovementState, dt: f32) -> bool {
        let wish_jump = state.flags.wish_jump();
        let on_ramp = state.last_ground_hit.tag == SurfaceTag::SpeedRamp;
        let friction_scale = if wish_jump || on_ramp { 0.0 } else { 1.0 };
        self.apply_friction(state, friction_scale, dt);

        let (wish_dir, wish_speed) = wish_velocity(state, state.move_command, self.params.move_speed);
        self.accelerate(&mut state.velocity, wish_dir, wish_speed, self.params.run_acceleration, dt);

        state.velocity.y = 0.0;
        jump::try_execute(state, self.params.jump_speed)
    }

    /// Air move: acceleration, air control and gravity.
    pub fn air_move(&self, state: &mut MovementState, dt: f32) {
        let params = self.params;
        state.flags.set(MovementFlags::KNOCK_BACK_OVERRIDE, false);

        let command = state.move_command;
        let (wish_dir, mut wish_speed) = wish_velocity(state, command, params.move_speed);
        let control_speed = wish_speed;

        let mut accel = if state.velocity.dot(wish_dir) < 0.0 {
            params.air_deceleration
        } else {
            params.air_acceleration
        };

        if command.is_pure_strafe() {
            wish_speed = wish_speed.min(params.side_strafe_speed);
            accel = params.side_strafe_acceleration;
        }

        self.accelerate(&mut state.velocity, wish_dir, wish_speed, accel, dt);
        if params.air_control > 0.0 {
            self.air_control(state, command, wish_dir, control_speed, dt);
        }

        state.velocity.y -= params.gravity * dt;
    }

    // ========================================================================
    // Building blocks
    // ========================================================================

    /// Scale horizontal speed down by ground friction.
    ///
    /// `drop = max(speed, run_deceleration) × friction × dt × scale`. No-op
    /// while sliding.
    pub fn apply_friction(&self, state: &mut MovementState, scale: f32, dt: f32) {
        if state.flags.sliding() {
            return;
        }

        let speed = horizontal(state.velocity).length();
        let control = speed.max(self.params.run_deceleration);
        let drop = control * self.params.friction * dt * scale;

        let mut new_speed = (speed - drop).max(0.0);
        if speed > 0.0 {
            new_speed /= speed;
        }

        state.velocity.x *= new_speed;
        state.velocity.z *= new_speed;
    }

    /// Accelerate toward `wish_dir` without exceeding `wish_speed` along it.
    pub fn accelerate(&self, velocity: &mut Vec3, wish_dir: Vec3, wish_speed: f32, accel: f32, dt: f32) {
        if velocity.length() >= self.params.acceleration_speed_cap {
            return;
        }

        let current_speed = velocity.dot(wish_dir);
        let add_speed = wish_speed - current_speed;
        if add_speed <= 0.0 {
            return;
        }

        let accel_speed = (accel * dt * wish_speed).min(add_speed);
        velocity.x += accel_speed * wish_dir.x;
        velocity.z += accel_speed * wish_dir.z;
    }

    /// Steer horizontal velocity toward the wish direction without changing
    /// its magnitude. Needs forward input.
    fn air_control(&self, state: &mut MovementState, command: MoveCommand, wish_dir: Vec3, wish_speed: f32, dt: f32) {
        if command.forward_axis == 0 || wish_speed == 0.0 {
            return;
        }

        let vertical = state.velocity.y;
        let flat = horizontal(state.velocity);
        let speed = flat.length();
        let mut dir = flat.normalize_or_zero();

        let dot = dir.dot(wish_dir);
        let k = AIR_CONTROL_SCALE * self.params.air_control * dot * dot * dt;

        if dot > 0.0 {
            dir = (dir * speed + wish_dir * k).normalize_or_zero();
        }

        state.velocity = Vec3::new(dir.x * speed, vertical, dir.z * speed);
    }

    /// Clamp each horizontal axis to ±max speed unless boosted or sliding.
    pub fn clamp_speed(&self, state: &mut MovementState) {
        if state.flags.boosted() || state.flags.sliding() {
            return;
        }

        let max = self.params.max_horizontal_speed;
        state.velocity.x = state.velocity.x.clamp(-max, max);
        state.velocity.z = state.velocity.z.clamp(-max, max);
    }
}

/// Wish direction and speed from the move command in facing space.
///
/// Zero input gives a zero direction and zero speed.
pub fn wish_velocity(state: &MovementState, command: MoveCommand, move_speed: f32) -> (Vec3, f32) {
    let raw = state.right() * f32::from(command.right_axis) + state.forward() * f32::from(command.forward_axis);
    let dir = raw.normalize_or_zero();
    if dir == Vec3::ZERO {
        return (Vec3::ZERO, 0.0);
    }
    (dir, move_speed)
}

/// Velocity used for this tick's position update.
///
/// Grounded on a walkable slope, horizontal motion follows the slope plane.
/// On a slope that is too steep, horizontal velocity is dropped (and stays
/// dropped). Otherwise velocity integrates as is.
pub fn effective_velocity(state: &mut MovementState) -> Vec3 {
    match state.slope {
        SlopeState::Traversable { normal } if state.flags.grounded() => {
            let v = state.velocity;
            project_on_plane(horizontal(v), normal) + Vec3::new(0.0, v.y, 0.0)
        }
        SlopeState::TooSteep { normal } => {
            state.velocity = Vec3::new(0.0, state.velocity.y, 0.0);
            project_on_plane(state.velocity, normal)
        }
        _ => state.velocity,
    }
}
