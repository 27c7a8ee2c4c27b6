//! Collision world containing tagged static geometry and character bodies.
//!
//! The world is only read during a tick. Hosts move character colliders
//! between ticks with [`CollisionWorld::set_collider_position`].

use glam::{Quat, Vec3};
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::na::{Quaternion, Translation3, UnitQuaternion};
use parry3d::query::{Ray, RayCast};
use parry3d::shape::SharedShape;

use super::flags::{LayerMask, SurfaceTag};
use super::probe::{ColliderId, ProbeBuffer, ProbeRay, ProbeResult, WorldProbe};

/// A collider in the world.
#[derive(Clone)]
pub struct Collider {
    /// Unique identifier for this collider.
    pub id: ColliderId,
    /// The collision shape.
    pub shape: SharedShape,
    /// Position and orientation in world space.
    pub transform: Isometry<Real>,
    /// Orientation as a glam quaternion (mirrors `transform`).
    pub rotation: Quat,
    /// Layers this collider belongs to.
    pub layers: LayerMask,
    /// Surface classification.
    pub tag: SurfaceTag,
}

impl Collider {
    /// Local right axis (+X) in world space.
    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }
}

impl std::fmt::Debug for Collider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collider")
            .field("id", &self.id)
            .field("shape", &self.shape.shape_type())
            .field("rotation", &self.rotation)
            .field("layers", &self.layers)
            .field("tag", &self.tag)
            .finish()
    }
}

/// The collision world.
///
/// Supports axis-aligned boxes, oriented boxes (ramps, slanted pads) and
/// vertical capsules (character bodies). Immutable during a tick, so it can
/// be shared across threads for parallel probes.
#[derive(Debug, Default, Clone)]
pub struct CollisionWorld {
    colliders: Vec<Collider>,
    next_id: ColliderId,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            colliders: Vec::new(),
            next_id: 0,
        }
    }

    /// Add an axis-aligned box.
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, layers: LayerMask, tag: SurfaceTag) -> ColliderId {
        self.add_oriented_box(center, half_extents, Quat::IDENTITY, layers, tag)
    }

    /// Add a rotated box.
    pub fn add_oriented_box(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        layers: LayerMask,
        tag: SurfaceTag,
    ) -> ColliderId {
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.insert(shape, center, rotation, layers, tag)
    }

    /// Add a vertical capsule centered on `center`.
    ///
    /// `half_height` is measured from the center to the tip of a cap.
    pub fn add_capsule(&mut self, center: Vec3, radius: f32, half_height: f32, layers: LayerMask) -> ColliderId {
        let cylinder_half_height = (half_height - radius).max(0.0);
        let shape = SharedShape::capsule_y(cylinder_half_height, radius);
        self.insert(shape, center, Quat::IDENTITY, layers, SurfaceTag::None)
    }

    /// Move an existing collider. Returns `false` if the id is unknown.
    pub fn set_collider_position(&mut self, id: ColliderId, center: Vec3) -> bool {
        match self.colliders.iter_mut().find(|c| c.id == id) {
            Some(collider) => {
                collider.transform = to_isometry(center, collider.rotation);
                true
            }
            None => false,
        }
    }

    /// Remove a collider. Returns `false` if the id is unknown.
    pub fn remove(&mut self, id: ColliderId) -> bool {
        let before = self.colliders.len();
        self.colliders.retain(|c| c.id != id);
        self.colliders.len() != before
    }

    /// Look up a collider.
    pub fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.iter().find(|c| c.id == id)
    }

    /// Remove all geometry.
    pub fn clear(&mut self) {
        self.colliders.clear();
    }

    /// Number of colliders.
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Nearest hit along a ray, ignoring `ignore`.
    ///
    /// Convenience for tools and tests; movement code goes through
    /// [`WorldProbe::cast_ray`] with a reusable buffer.
    pub fn raycast_nearest(
        &self,
        ray: ProbeRay,
        max_distance: f32,
        mask: LayerMask,
        ignore: Option<ColliderId>,
    ) -> ProbeResult {
        let mut buffer = ProbeBuffer::with_capacity(self.colliders.len());
        self.cast_ray(ray, max_distance, mask, &mut buffer);
        buffer.sort_by_distance();
        buffer
            .hits()
            .iter()
            .copied()
            .find(|hit| Some(hit.collider) != ignore)
            .unwrap_or_else(ProbeResult::miss)
    }

    fn insert(
        &mut self,
        shape: SharedShape,
        center: Vec3,
        rotation: Quat,
        layers: LayerMask,
        tag: SurfaceTag,
    ) -> ColliderId {
        let id = self.next_id;
        self.next_id += 1;

        let rotation = rotation.normalize();
        self.colliders.push(Collider {
            id,
            shape,
            transform: to_isometry(center, rotation),
            rotation,
            layers,
            tag,
        });

        id
    }
}

impl WorldProbe for CollisionWorld {
    fn cast_ray(&self, ray: ProbeRay, max_distance: f32, mask: LayerMask, hits: &mut ProbeBuffer) {
        let Some(dir) = ray.unit_direction() else {
            return;
        };
        if !(max_distance > 0.0) {
            return;
        }

        let parry_ray = Ray::new(
            Point::new(ray.origin.x, ray.origin.y, ray.origin.z),
            Vector::new(dir.x, dir.y, dir.z),
        );

        for collider in &self.colliders {
            if !mask.intersects(collider.layers) {
                continue;
            }

            let Some(intersection) = collider
                .shape
                .cast_ray_and_get_normal(&collider.transform, &parry_ray, max_distance, true)
            else {
                continue;
            };
            let toi = intersection.time_of_impact;
            if toi > max_distance {
                continue;
            }

            // Zero normal when the origin starts inside the shape
            let normal =
                Vec3::new(intersection.normal.x, intersection.normal.y, intersection.normal.z).normalize_or_zero();
            let normal = if normal == Vec3::ZERO { -dir } else { normal };

            hits.push(ProbeResult {
                hit: true,
                distance: toi,
                normal,
                surface_tag: collider.tag,
                point: ray.origin + dir * toi,
                collider: collider.id,
                surface_right: collider.right(),
            });
        }
    }
}

fn to_isometry(center: Vec3, rotation: Quat) -> Isometry<Real> {
    let rotation = UnitQuaternion::new_normalize(Quaternion::new(rotation.w, rotation.x, rotation.y, rotation.z));
    Isometry::from_parts(Translation3::new(center.x, center.y, center.z), rotation)
}

// ============================================================================
// Tests
// ============================================================================
