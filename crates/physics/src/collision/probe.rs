//! Ray probes and their results.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::flags::{LayerMask, SurfaceTag};

/// Identifier of a collider in the world.
pub type ColliderId = u32;

/// Default capacity of a [`ProbeBuffer`].
pub const DEFAULT_PROBE_CAPACITY: usize = 64;

/// A ray in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeRay {
    /// Ray origin.
    pub origin: Vec3,
    /// Ray direction. Need not be normalized; probes normalize it.
    pub direction: Vec3,
}

impl ProbeRay {
    /// Create a ray from origin and direction.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Normalized direction, or `None` for a zero or non-finite direction.
    #[inline]
    pub fn unit_direction(&self) -> Option<Vec3> {
        let dir = self.direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            None
        } else {
            Some(dir)
        }
    }
}

/// A single ray hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Whether anything was hit. `false` results carry no other meaning.
    pub hit: bool,

    /// Distance from the ray origin to the hit point.
    pub distance: f32,

    /// Surface normal at the hit point (unit length, facing the ray).
    pub normal: Vec3,

    /// Tag of the surface that was hit.
    pub surface_tag: SurfaceTag,

    /// Hit point in world space.
    pub point: Vec3,

    /// Collider that was hit.
    pub collider: ColliderId,

    /// Local right axis of the hit collider, in world space.
    ///
    /// Speed ramps launch along `cross(normal, -surface_right)`.
    pub surface_right: Vec3,
}

impl Default for ProbeResult {
    fn default() -> Self {
        Self::miss()
    }
}

impl ProbeResult {
    /// A result that hit nothing.
    pub fn miss() -> Self {
        Self {
            hit: false,
            distance: f32::INFINITY,
            normal: Vec3::Y,
            surface_tag: SurfaceTag::None,
            point: Vec3::ZERO,
            collider: ColliderId::MAX,
            surface_right: Vec3::X,
        }
    }

    /// Angle between `up` and the hit normal, in degrees.
    pub fn slope_angle_degrees(&self, up: Vec3) -> f32 {
        up.angle_between(self.normal).to_degrees()
    }
}

/// Pre-sized scratch storage for probe hits.
///
/// Owned by the caller and reused across every query of a tick so probing
/// never allocates once the buffer has warmed up.
#[derive(Debug, Clone)]
pub struct ProbeBuffer {
    hits: Vec<ProbeResult>,
}

impl Default for ProbeBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_PROBE_CAPACITY)
    }
}

impl ProbeBuffer {
    /// Create a buffer that can hold `capacity` hits without growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            hits: Vec::with_capacity(capacity),
        }
    }

    /// Remove all hits, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.hits.clear();
    }

    /// Record a hit.
    #[inline]
    pub fn push(&mut self, hit: ProbeResult) {
        self.hits.push(hit);
    }

    /// Keep only hits matching `keep`, preserving order.
    #[inline]
    pub fn retain(&mut self, keep: impl FnMut(&ProbeResult) -> bool) {
        self.hits.retain(keep);
    }

    /// Order hits nearest first. Ties fall back to collider id so the order
    /// never depends on insertion order.
    pub fn sort_by_distance(&mut self) {
        self.hits.sort_unstable_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.collider.cmp(&b.collider))
        });
    }

    /// Hits currently stored.
    #[inline]
    pub fn hits(&self) -> &[ProbeResult] {
        &self.hits
    }

    /// Number of hits currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether the buffer holds no hits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Capacity of the underlying storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.hits.capacity()
    }
}

/// Read-only ray queries against world geometry.
///
/// Implementations append every hit within `max_distance` to `hits`. They
/// must not clear the buffer, sort it, or filter out any collider by
/// identity; callers handle that.
pub trait WorldProbe {
    /// Cast a ray and collect all hits on layers in `mask`.
    fn cast_ray(&self, ray: ProbeRay, max_distance: f32, mask: LayerMask, hits: &mut ProbeBuffer);
}

impl<T: WorldProbe + ?Sized> WorldProbe for &T {
    fn cast_ray(&self, ray: ProbeRay, max_distance: f32, mask: LayerMask, hits: &mut ProbeBuffer) {
        (**self).cast_ray(ray, max_distance, mask, hits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit_at(distance: f32, collider: ColliderId) -> ProbeResult {
        ProbeResult {
            hit: true,
            distance,
            collider,
            ..ProbeResult::miss()
        }
    }

    #[test]
    fn test_miss_has_no_hit() {
        let result = ProbeResult::miss();
        assert!(!result.hit);
        assert!(result.distance.is_infinite());
    }

    #[test]
    fn test_sort_by_distance_with_tie_break() {
        let mut buffer = ProbeBuffer::with_capacity(4);
        buffer.push(hit_at(2.0, 1));
        buffer.push(hit_at(1.0, 7));
        buffer.push(hit_at(1.0, 3));
        buffer.sort_by_distance();

        let order: Vec<_> = buffer.hits().iter().map(|h| h.collider).collect();
        assert_eq!(order, vec![3, 7, 1]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut buffer = ProbeBuffer::with_capacity(8);
        buffer.push(hit_at(1.0, 0));
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.capacity() >= 8);
    }

    #[test]
    fn test_unit_direction_rejects_zero() {
        assert!(ProbeRay::new(Vec3::ZERO, Vec3::ZERO).unit_direction().is_none());
        let dir = ProbeRay::new(Vec3::ZERO, Vec3::new(0.0, -3.0, 0.0)).unit_direction();
        assert_eq!(dir, Some(Vec3::NEG_Y));
    }

    #[test]
    fn test_slope_angle() {
        let result = ProbeResult {
            normal: Vec3::new(1.0, 1.0, 0.0).normalize(),
            ..hit_at(1.0, 0)
        };
        assert!((result.slope_angle_degrees(Vec3::Y) - 45.0).abs() < 0.01);
    }
}
