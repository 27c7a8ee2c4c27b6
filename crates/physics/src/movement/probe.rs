//! Ground, ceiling and wall queries for one character.

use glam::Vec3;

use crate::collision::{ColliderId, LayerMask, ProbeBuffer, ProbeRay, ProbeResult, WorldProbe};

use super::config::MovementParameters;
use super::state::SlopeState;

/// Result of the ground query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundProbe {
    /// Slope found by the extended search.
    pub slope: SlopeState,

    /// Accepted ground contact within the contact distance, if any.
    pub contact: Option<ProbeResult>,
}

/// Issues movement queries against a [`WorldProbe`], filtering out the
/// character's own collider.
///
/// All queries share the caller's [`ProbeBuffer`]; its contents are
/// overwritten by every query.
pub struct CollisionProbe<'a, W: WorldProbe + ?Sized> {
    world: &'a W,
    buffer: &'a mut ProbeBuffer,
    ignore: Option<ColliderId>,
    mask: LayerMask,
}

impl<'a, W: WorldProbe + ?Sized> CollisionProbe<'a, W> {
    /// Probe against `world` using the movement layer mask.
    pub fn new(world: &'a W, buffer: &'a mut ProbeBuffer) -> Self {
        Self {
            world,
            buffer,
            ignore: None,
            mask: LayerMask::MASK_MOVEMENT,
        }
    }

    /// Skip hits against this collider.
    pub fn ignoring(mut self, collider: ColliderId) -> Self {
        self.ignore = Some(collider);
        self
    }

    /// Override the layer mask.
    pub fn with_mask(mut self, mask: LayerMask) -> Self {
        self.mask = mask;
        self
    }

    /// Collect qualifying hits along `ray`, nearest first.
    ///
    /// Self hits and non-hits are dropped.
    pub fn cast_all(&mut self, ray: ProbeRay, max_distance: f32) -> &[ProbeResult] {
        self.buffer.clear();
        if ray.unit_direction().is_none() || !(max_distance > 0.0) {
            return self.buffer.hits();
        }

        self.world.cast_ray(ray, max_distance, self.mask, self.buffer);
        let ignore = self.ignore;
        self.buffer.retain(|hit| hit.hit && Some(hit.collider) != ignore && hit.distance <= max_distance);
        self.buffer.sort_by_distance();
        self.buffer.hits()
    }

    /// Nearest qualifying hit along `ray`.
    pub fn cast_nearest(&mut self, ray: ProbeRay, max_distance: f32) -> Option<ProbeResult> {
        self.cast_all(ray, max_distance).first().copied()
    }

    /// Ground query from the character center.
    ///
    /// A slope search straight down (extended by `sin(max_slope) × half_height`)
    /// classifies the nearest surface. On a walkable slope the contact ray is
    /// re-aimed along the negated slope normal. The contact ray then picks
    /// the best candidate within the contact distance: bounce pads over
    /// speed ramps over plain ground, nearest first within a class.
    pub fn ground(&mut self, position: Vec3, params: &MovementParameters) -> GroundProbe {
        let down = Vec3::NEG_Y;
        let mut contact_direction = down;

        let slope = match self.cast_nearest(ProbeRay::new(position, down), params.slope_search_distance()) {
            None => SlopeState::None,
            Some(hit) => {
                if params.is_walkable(hit.slope_angle_degrees(Vec3::Y)) {
                    contact_direction = -hit.normal;
                    SlopeState::Traversable { normal: hit.normal }
                } else {
                    SlopeState::TooSteep { normal: hit.normal }
                }
            }
        };

        let hits = self.cast_all(
            ProbeRay::new(position, contact_direction),
            params.ground_probe_distance(),
        );

        let mut contact: Option<ProbeResult> = None;
        for hit in hits {
            let better = match contact {
                None => true,
                Some(best) => hit.surface_tag.ground_precedence() > best.surface_tag.ground_precedence(),
            };
            if better {
                contact = Some(*hit);
            }
        }

        GroundProbe { slope, contact }
    }

    /// Ceiling query straight up from the character center.
    pub fn ceiling(&mut self, position: Vec3, params: &MovementParameters) -> Option<ProbeResult> {
        self.cast_nearest(ProbeRay::new(position, Vec3::Y), params.ceiling_probe_distance())
    }

    /// Wall query along the velocity direction.
    ///
    /// Returns nothing for a zero velocity.
    pub fn wall(&mut self, position: Vec3, velocity: Vec3, params: &MovementParameters) -> Option<ProbeResult> {
        self.cast_nearest(ProbeRay::new(position, velocity), params.wall_probe_distance)
    }
}
