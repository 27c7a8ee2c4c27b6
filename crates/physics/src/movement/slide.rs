//! Sliding along obstacles.
//!
//! The same cross-product correction serves two callers: the controller's
//! wall response during a move, and steering code asking whether a path is
//! blocked ([`slide_on_obstacle`]).

use glam::Vec3;

use crate::collision::{ProbeRay, SurfaceTag, WorldProbe};

use super::probe::CollisionProbe;

/// Direction along a wall, signed to agree with `travel`.
///
/// `cross(normal, up)` lies in the wall plane; it is flipped when it points
/// against the travel direction.
#[inline]
pub fn wall_correction(normal: Vec3, up: Vec3, travel: Vec3) -> Vec3 {
    let correction = normal.cross(up);
    if correction.dot(travel) < 0.0 {
        -correction
    } else {
        correction
    }
}

/// Wall response during movement.
///
/// Horizontal velocity is replaced by the raw correction vector; vertical
/// velocity is kept exactly. Facing is not touched.
#[inline]
pub fn wall_slide(velocity: Vec3, normal: Vec3, up: Vec3) -> Vec3 {
    let correction = wall_correction(normal, up, velocity);
    Vec3::new(correction.x, velocity.y, correction.z)
}

/// Answer from [`slide_on_obstacle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideOnObstacle {
    /// Direction to travel in. Unchanged when nothing was hit.
    pub direction: Vec3,
    /// Speed to travel at. Never larger than the input speed.
    pub speed: f32,
    /// Whether a `Level` obstacle was hit.
    pub is_hit: bool,
}

/// Check a steering path for `Level` obstacles.
///
/// On a hit, `direction` becomes the normalized wall correction. When
/// `facing` points into the obstacle, speed is scaled by
/// `1 + dot(facing, normal)`. The nearest hit decides: a nearer surface
/// with any other tag means no hit.
pub fn slide_on_obstacle<W: WorldProbe + ?Sized>(
    probe: &mut CollisionProbe<'_, W>,
    ray: ProbeRay,
    ray_distance: f32,
    direction: Vec3,
    speed: f32,
    facing: Vec3,
    up: Vec3,
) -> SlideOnObstacle {
    let unchanged = SlideOnObstacle {
        direction,
        speed,
        is_hit: false,
    };

    let Some(hit) = probe.cast_nearest(ray, ray_distance) else {
        return unchanged;
    };
    if hit.surface_tag != SurfaceTag::Level {
        return unchanged;
    }

    let corrected = wall_correction(hit.normal, up, direction).normalize_or_zero();
    let facing_dot = facing.dot(hit.normal);
    let speed = if facing_dot < 0.0 { speed * (1.0 + facing_dot) } else { speed };

    SlideOnObstacle {
        direction: corrected,
        speed,
        is_hit: true,
    }
}

/// Answer from [`ground_check`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundCheck {
    pub is_grounded: bool,
    /// Height of the hit point, or the caller's height when nothing was hit.
    pub grounded_y: f32,
}

/// Does `ray` hit anything within its own length?
///
/// The ray's direction length is the probe distance.
pub fn ground_check<W: WorldProbe + ?Sized>(
    probe: &mut CollisionProbe<'_, W>,
    ray: ProbeRay,
    current_y: f32,
) -> GroundCheck {
    match probe.cast_nearest(ray, ray.direction.length()) {
        Some(hit) => GroundCheck {
            is_grounded: true,
            grounded_y: hit.point.y,
        },
        None => GroundCheck {
            is_grounded: false,
            grounded_y: current_y,
        },
    }
}
