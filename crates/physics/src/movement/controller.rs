//! Character movement controller.
//!
//! This is the main entry point for character movement. It takes one input
//! command per tick and advances the movement state through the world probe.

use glam::Vec3;

use crate::collision::{ProbeRay, ProbeResult, WorldProbe};
use crate::math::wrap_degrees;

use super::config::{MovementParameters, ParamsError};
use super::events::{detect_transitions, MovementEvents};
use super::integrator::{effective_velocity, MovementIntegrator};
use super::jump;
use super::probe::CollisionProbe;
use super::slide::wall_slide;
use super::state::{GroundHit, InputCommand, MoveCommand, MovementFlags, MovementState, SlopeState};
use super::surface::{SurfaceClassifier, SurfaceEffect, WallEffect, UP};

/// How far below a spawn point to look for ground.
const SPAWN_DROP_DISTANCE: f32 = 100.0;

/// Character movement controller.
///
/// Stateless apart from its parameters: everything that changes lives in
/// [`MovementState`], so a tick can be re-run from a saved state and produce
/// the same result.
///
/// # Example
///
/// ```ignore
/// let controller = CharacterController::new(MovementParameters::default())?;
/// let mut buffer = ProbeBuffer::default();
///
/// // Each tick:
/// let mut probe = CollisionProbe::new(&world, &mut buffer).ignoring(my_collider);
/// let events = controller.step(&mut state, &input, &mut probe, dt);
/// ```
#[derive(Debug, Clone)]
pub struct CharacterController {
    params: MovementParameters,
}

impl CharacterController {
    /// Create a controller. Fails if the parameters do not validate.
    pub fn new(params: MovementParameters) -> Result<Self, ParamsError> {
        if let Err(err) = params.validate() {
            log::warn!("rejected movement parameters: {err}");
            return Err(err);
        }
        Ok(Self { params })
    }

    /// Create a controller with default parameters.
    pub fn with_default_params() -> Self {
        Self {
            params: MovementParameters::default(),
        }
    }

    pub fn params(&self) -> &MovementParameters {
        &self.params
    }

    /// Build a state standing on the ground below `spawn`.
    ///
    /// `spawn` marks where the base should go; the ground search starts half
    /// a height above it. Without ground below, the state is left airborne
    /// with its center at `spawn`.
    pub fn spawn_at<W: WorldProbe + ?Sized>(&self, spawn: Vec3, probe: &mut CollisionProbe<'_, W>) -> MovementState {
        let half_height = self.params.half_height;
        let origin = spawn + UP * half_height;
        let mut state = MovementState::new(spawn);

        let Some(hit) = probe.cast_nearest(ProbeRay::new(origin, Vec3::NEG_Y), half_height + SPAWN_DROP_DISTANCE)
        else {
            log::debug!("no ground below spawn point {spawn}");
            return state;
        };

        state.position = hit.point + UP * half_height;
        state.last_ground_hit = GroundHit::from(&hit);
        if self.params.is_walkable(hit.slope_angle_degrees(UP)) {
            state.slope = SlopeState::Traversable { normal: hit.normal };
            state.flags.set(MovementFlags::GROUNDED, true);
            state.flags.set(MovementFlags::FLOOR_DETECTED, true);
        } else {
            state.slope = SlopeState::TooSteep { normal: hit.normal };
        }
        state
    }

    /// Overwrite velocity from an external impulse.
    ///
    /// The ground query is skipped until the next air move, so the character
    /// leaves the ground even on a downward knock back.
    pub fn apply_knock_back(&self, state: &mut MovementState, velocity: Vec3) {
        if !velocity.is_finite() {
            return;
        }
        state.velocity = velocity;
        state.flags.set(MovementFlags::KNOCK_BACK_OVERRIDE, true);
        state.flags.set(MovementFlags::GROUNDED, false);
    }

    /// Advance one tick.
    ///
    /// Order: yaw, ground, ceiling, jump queue, crouch, ground or air move,
    /// wall response, speed clamp, position.
    pub fn step<W: WorldProbe + ?Sized>(
        &self,
        state: &mut MovementState,
        input: &InputCommand,
        probe: &mut CollisionProbe<'_, W>,
        dt: f32,
    ) -> MovementEvents {
        let mut events = MovementEvents::default();
        if !(dt > 0.0 && dt.is_finite()) {
            return events;
        }

        let previous = state.clone();

        if input.aim_yaw_delta.is_finite() {
            state.yaw = wrap_degrees(state.yaw + input.aim_yaw_delta);
        }

        let was_grounded = state.flags.grounded();
        self.check_ground(state, probe);
        if !was_grounded && state.flags.grounded() {
            events.insert(MovementEvents::LANDED);
        }
        self.check_ceiling(state, probe);

        jump::queue_jump(state, input);
        jump::toggle_crouch(state, input);

        if !state.flags.sliding() {
            state.move_command = MoveCommand::from_input(input);
        }

        let integrator = MovementIntegrator::new(&self.params);
        if state.flags.grounded() {
            state.flags.set(MovementFlags::JUMPING, false);
            if integrator.ground_move(state, dt) {
                log::debug!("jump at {}", state.position);
                events.insert(MovementEvents::JUMPED);
            }
        } else {
            integrator.air_move(state, dt);
        }

        if self.check_wall(state, probe) {
            events.insert(MovementEvents::WALL_BOUNCE);
        }

        integrator.clamp_speed(state);
        self.move_position(state, probe, dt);

        events |= detect_transitions(&previous, state);
        if !events.is_empty() {
            log::trace!("movement events: {:?}", events.names().collect::<Vec<_>>());
        }
        events
    }

    // ========================================================================
    // Ground
    // ========================================================================

    fn check_ground<W: WorldProbe + ?Sized>(&self, state: &mut MovementState, probe: &mut CollisionProbe<'_, W>) {
        if state.flags.knock_back_override() {
            state.flags.set(MovementFlags::GROUNDED, false);
            return;
        }

        let ground = probe.ground(state.position, &self.params);
        state.slope = ground.slope;

        let Some(hit) = ground.contact else {
            state.flags.set(MovementFlags::FLOOR_DETECTED, false);
            state.flags.set(MovementFlags::GROUNDED, false);
            state.flags.set(MovementFlags::BOOSTED, false);
            return;
        };

        state.flags.set(MovementFlags::FLOOR_DETECTED, true);
        state.last_ground_hit = GroundHit::from(&hit);

        let classifier = SurfaceClassifier::new(&self.params);
        match classifier.classify_ground(&hit, state.flags.wish_jump(), state.velocity) {
            SurfaceEffect::SpeedRamp { boost } => {
                state.flags.set(MovementFlags::GROUNDED, false);
                if !state.flags.boosted() {
                    log::debug!("speed ramp {} boost {boost}", hit.collider);
                    state.velocity = boost;
                    state.flags.set(MovementFlags::BOOSTED, true);
                    state.flags.set(MovementFlags::SLIDING, true);
                }
            }
            SurfaceEffect::BouncePad { boost } => {
                state.flags.set(MovementFlags::GROUNDED, false);
                if !state.flags.boosted() {
                    log::debug!("bounce pad {} boost {boost}", hit.collider);
                    state.velocity = boost;
                    state.flags.set(MovementFlags::BOOSTED, true);
                    state.flags.set(MovementFlags::SLIDING, false);
                }
            }
            SurfaceEffect::Normal if matches!(ground.slope, SlopeState::TooSteep { .. }) => {
                // Too steep to stand on: fall and slide down the slope plane
                state.flags.set(MovementFlags::GROUNDED, false);
                state.flags.set(MovementFlags::SLIDING, false);
            }
            SurfaceEffect::Normal => {
                if !state.flags.bounce_pad_wall_active() && !jump::ascending_from_jump(state) {
                    state.flags.set(MovementFlags::BOOSTED, false);
                    state.flags.set(MovementFlags::GROUNDED, true);
                    state.velocity.y = 0.0;
                    self.snap_to_ground(state, &hit);
                }
                state.flags.set(MovementFlags::SLIDING, false);
            }
        }
    }

    /// Pull the character down along the contact ray until it rests half a
    /// height from the contact point. Never pushes up.
    fn snap_to_ground(&self, state: &mut MovementState, hit: &ProbeResult) {
        let gap = hit.distance - self.params.half_height;
        if gap <= 0.0 || hit.distance <= 0.0 {
            return;
        }
        let to_contact = hit.point - state.position;
        state.position += to_contact * (gap / hit.distance);
    }

    fn check_ceiling<W: WorldProbe + ?Sized>(&self, state: &mut MovementState, probe: &mut CollisionProbe<'_, W>) {
        let hit = probe.ceiling(state.position, &self.params).is_some();
        state.flags.set(MovementFlags::HIT_CEILING, hit);
        if hit && state.velocity.y > 0.0 {
            state.velocity.y = 0.0;
        }
    }

    // ========================================================================
    // Walls
    // ========================================================================

    /// Wall response. Returns whether a wall bounce pad fired.
    fn check_wall<W: WorldProbe + ?Sized>(&self, state: &mut MovementState, probe: &mut CollisionProbe<'_, W>) -> bool {
        let classifier = SurfaceClassifier::new(&self.params);
        let effect = probe
            .wall(state.position, state.velocity, &self.params)
            .map_or(WallEffect::None, |hit| classifier.classify_wall(&hit));

        match effect {
            WallEffect::Slide { normal } => {
                state.velocity = wall_slide(state.velocity, normal, UP);
                state.flags.set(MovementFlags::BOUNCE_PAD_WALL_ACTIVE, false);
                false
            }
            WallEffect::BouncePad { boost } => {
                state.flags.set(MovementFlags::GROUNDED, false);
                if state.flags.bounce_pad_wall_active() {
                    return false;
                }
                log::debug!("wall bounce pad boost {boost}");
                state.velocity = boost;
                state.flags.set(MovementFlags::BOUNCE_PAD_WALL_ACTIVE, true);
                state.flags.set(MovementFlags::BOOSTED, true);
                true
            }
            WallEffect::None => {
                state.flags.set(MovementFlags::BOUNCE_PAD_WALL_ACTIVE, false);
                false
            }
        }
    }

    // ========================================================================
    // Position
    // ========================================================================

    /// Integrate position. A descending step is cut short so the base stops
    /// on the surface below instead of passing through it.
    fn move_position<W: WorldProbe + ?Sized>(&self, state: &mut MovementState, probe: &mut CollisionProbe<'_, W>, dt: f32) {
        let velocity = effective_velocity(state);
        let mut displacement = velocity * dt;

        if displacement.y < 0.0 {
            let half_height = self.params.half_height;
            let origin = state.position + Vec3::new(displacement.x, 0.0, displacement.z);
            let reach = half_height - displacement.y;
            if let Some(hit) = probe.cast_nearest(ProbeRay::new(origin, Vec3::NEG_Y), reach) {
                let max_drop = (hit.distance - half_height).max(0.0);
                if -displacement.y > max_drop {
                    displacement.y = -max_drop;
                }
            }
        }

        state.position += displacement;
    }
}

// ============================================================================
// Tests
// ============================================================================
