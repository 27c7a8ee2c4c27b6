//! Level loading and management.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vaultrun_physics::{CollisionWorld, LayerMask, SurfaceTag};

/// Height below which characters are killed.
pub const DEFAULT_KILL_HEIGHT: f32 = -50.0;

/// Errors from loading a level description.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level description: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("brush {index}: {reason}")]
    InvalidBrush { index: usize, reason: &'static str },

    #[error("spawn point {index} is not finite")]
    InvalidSpawn { index: usize },

    #[error("level has no spawn points")]
    NoSpawnPoints,
}

/// A level: tagged collision geometry and spawn points.
#[derive(Debug, Clone)]
pub struct Level {
    /// Level identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Collision world for movement probes.
    pub collision: CollisionWorld,

    /// Character spawn points.
    pub spawn_points: Vec<SpawnPoint>,

    /// Characters falling below this height are killed.
    pub kill_height: f32,
}

/// A spawn point for characters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Where the character's base goes, before dropping to the ground.
    pub position: Vec3,

    /// Initial yaw in degrees.
    #[serde(default)]
    pub yaw: f32,
}

/// A box in a level description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub center: Vec3,
    pub half_extents: Vec3,

    /// Rotation as XYZ Euler angles in degrees.
    #[serde(default)]
    pub rotation: Vec3,

    #[serde(default = "default_brush_tag")]
    pub tag: SurfaceTag,
}

fn default_brush_tag() -> SurfaceTag {
    SurfaceTag::Level
}

impl Brush {
    fn rotation_quat(&self) -> Quat {
        let r = self.rotation;
        Quat::from_euler(EulerRot::XYZ, r.x.to_radians(), r.y.to_radians(), r.z.to_radians())
    }

    fn validate(&self) -> Result<(), &'static str> {
        if !(self.center.is_finite() && self.rotation.is_finite()) {
            return Err("center and rotation must be finite");
        }
        if !(self.half_extents.is_finite() && self.half_extents.min_element() > 0.0) {
            return Err("half extents must be positive");
        }
        Ok(())
    }
}

/// Serialized form of a level.
///
/// ```toml
/// id = "yard"
/// name = "Yard"
///
/// [[brushes]]
/// center = [0.0, -0.5, 0.0]
/// half_extents = [20.0, 0.5, 20.0]
///
/// [[brushes]]
/// center = [5.0, 0.05, 0.0]
/// half_extents = [1.0, 0.1, 1.0]
/// tag = "BouncePad"
///
/// [[spawn_points]]
/// position = [0.0, 0.0, -10.0]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDescription {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_kill_height")]
    pub kill_height: f32,
    #[serde(default)]
    pub brushes: Vec<Brush>,
    #[serde(default)]
    pub spawn_points: Vec<SpawnPoint>,
}

fn default_kill_height() -> f32 {
    DEFAULT_KILL_HEIGHT
}

impl Level {
    /// Create an empty level.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            collision: CollisionWorld::new(),
            spawn_points: Vec::new(),
            kill_height: DEFAULT_KILL_HEIGHT,
        }
    }

    /// Build a level from a description.
    pub fn from_description(description: &LevelDescription) -> Result<Self, LevelError> {
        if description.spawn_points.is_empty() {
            return Err(LevelError::NoSpawnPoints);
        }

        let name = if description.name.is_empty() {
            &description.id
        } else {
            &description.name
        };
        let mut level = Self::new(&description.id, name);
        level.kill_height = description.kill_height;

        for (index, brush) in description.brushes.iter().enumerate() {
            brush
                .validate()
                .map_err(|reason| LevelError::InvalidBrush { index, reason })?;
            level.add_brush(brush);
        }

        for (index, spawn) in description.spawn_points.iter().enumerate() {
            if !(spawn.position.is_finite() && spawn.yaw.is_finite()) {
                return Err(LevelError::InvalidSpawn { index });
            }
            level.spawn_points.push(*spawn);
        }

        log::debug!(
            "loaded level '{}' ({} brushes, {} spawn points)",
            level.id,
            description.brushes.len(),
            level.spawn_points.len()
        );
        Ok(level)
    }

    /// Parse and build a level from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, LevelError> {
        let description: LevelDescription = toml::from_str(source)?;
        Self::from_description(&description)
    }

    /// Add a box to the collision world.
    pub fn add_brush(&mut self, brush: &Brush) {
        self.collision.add_oriented_box(
            brush.center,
            brush.half_extents,
            brush.rotation_quat(),
            LayerMask::WORLD,
            brush.tag,
        );
    }

    /// Create a simple test level for development.
    ///
    /// A walled floor with a climbable slope, a speed ramp, a ground bounce
    /// pad, a wall bounce pad and a low ceiling.
    pub fn test_arena() -> Self {
        let mut level = Self::new("test_arena", "Test Arena");

        let arena_size = 50.0;
        let wall_height = 5.0;
        let wall_thickness = 0.5;

        // Floor, top at y = 0
        level.add_brush(&Brush {
            center: Vec3::new(0.0, -0.5, 0.0),
            half_extents: Vec3::new(arena_size, 0.5, arena_size),
            rotation: Vec3::ZERO,
            tag: SurfaceTag::Level,
        });

        // Walls
        for (center, half_extents) in [
            (
                Vec3::new(0.0, wall_height / 2.0, -arena_size),
                Vec3::new(arena_size, wall_height / 2.0, wall_thickness),
            ),
            (
                Vec3::new(0.0, wall_height / 2.0, arena_size),
                Vec3::new(arena_size, wall_height / 2.0, wall_thickness),
            ),
            (
                Vec3::new(arena_size, wall_height / 2.0, 0.0),
                Vec3::new(wall_thickness, wall_height / 2.0, arena_size),
            ),
            (
                Vec3::new(-arena_size, wall_height / 2.0, 0.0),
                Vec3::new(wall_thickness, wall_height / 2.0, arena_size),
            ),
        ] {
            level.add_brush(&Brush {
                center,
                half_extents,
                rotation: Vec3::ZERO,
                tag: SurfaceTag::Level,
            });
        }

        // 20 degree slope rising toward -Z
        level.add_brush(&Brush {
            center: Vec3::new(-30.0, 0.0, -25.0),
            half_extents: Vec3::new(5.0, 0.5, 10.0),
            rotation: Vec3::new(20.0, 0.0, 0.0),
            tag: SurfaceTag::Level,
        });

        // Speed ramp patch, flush with the floor
        level.add_brush(&Brush {
            center: Vec3::new(0.0, -0.095, 20.0),
            half_extents: Vec3::new(3.0, 0.1, 3.0),
            rotation: Vec3::ZERO,
            tag: SurfaceTag::SpeedRamp,
        });

        // Ground bounce pad
        level.add_brush(&Brush {
            center: Vec3::new(20.0, -0.095, 20.0),
            half_extents: Vec3::new(2.0, 0.1, 2.0),
            rotation: Vec3::ZERO,
            tag: SurfaceTag::BouncePad,
        });

        // Wall bounce pad on the inside of the east wall
        level.add_brush(&Brush {
            center: Vec3::new(arena_size - wall_thickness - 0.1, 2.5, -20.0),
            half_extents: Vec3::new(0.1, 2.5, 4.0),
            rotation: Vec3::ZERO,
            tag: SurfaceTag::BouncePad,
        });

        // Low ceiling, underside at y = 3
        level.add_brush(&Brush {
            center: Vec3::new(-30.0, 3.5, 25.0),
            half_extents: Vec3::new(8.0, 0.5, 8.0),
            rotation: Vec3::ZERO,
            tag: SurfaceTag::Level,
        });

        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(-20.0, 0.0, 0.0),
            yaw: 90.0,
        });
        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(20.0, 0.0, 0.0),
            yaw: 270.0,
        });

        level
    }

    /// Spawn point for the `index`-th spawn, cycling through the list.
    pub fn spawn_point(&self, index: usize) -> Option<&SpawnPoint> {
        if self.spawn_points.is_empty() {
            return None;
        }
        self.spawn_points.get(index % self.spawn_points.len())
    }

    /// Check if a position is below the kill height.
    #[inline]
    pub fn is_out_of_bounds(&self, position: Vec3) -> bool {
        position.y < self.kill_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultrun_physics::ProbeRay;

    #[test]
    fn test_level_creation() {
        let level = Level::new("test", "Test Level");
        assert_eq!(level.id, "test");
        assert_eq!(level.collision.collider_count(), 0);
        assert!(level.spawn_point(0).is_none());
    }

    #[test]
    fn test_test_arena() {
        let level = Level::test_arena();
        assert!(level.collision.collider_count() > 0);
        assert_eq!(level.spawn_points.len(), 2);
        assert_eq!(level.spawn_point(2), level.spawn_point(0));
    }

    #[test]
    fn test_arena_pads_win_over_floor() {
        let level = Level::test_arena();

        let hit = level.collision.raycast_nearest(
            ProbeRay::new(Vec3::new(20.0, 1.0, 20.0), Vec3::NEG_Y),
            2.0,
            LayerMask::WORLD,
            None,
        );
        assert!(hit.hit);
        assert_eq!(hit.surface_tag, SurfaceTag::BouncePad);
    }

    #[test]
    fn test_from_toml() {
        let source = r#"
            id = "yard"
            kill_height = -10.0

            [[brushes]]
            center = [0.0, -0.5, 0.0]
            half_extents = [20.0, 0.5, 20.0]

            [[brushes]]
            center = [5.0, 0.0, 0.0]
            half_extents = [1.0, 0.1, 1.0]
            rotation = [0.0, 45.0, 0.0]
            tag = "SpeedRamp"

            [[spawn_points]]
            position = [0.0, 0.0, -10.0]
            yaw = 180.0
        "#;

        let level = Level::from_toml_str(source).unwrap();
        assert_eq!(level.name, "yard");
        assert_eq!(level.kill_height, -10.0);
        assert_eq!(level.collision.collider_count(), 2);
        assert_eq!(level.spawn_points[0].yaw, 180.0);
        assert!(level.is_out_of_bounds(Vec3::new(0.0, -11.0, 0.0)));

        let ramp = level.collision.collider(1).unwrap();
        assert_eq!(ramp.tag, SurfaceTag::SpeedRamp);
        assert!((ramp.right() - Vec3::new(1.0, 0.0, -1.0).normalize()).length() < 1e-5);
    }

    #[test]
    fn test_from_toml_rejects_bad_levels() {
        let no_spawns = r#"
            id = "empty"
        "#;
        assert!(matches!(Level::from_toml_str(no_spawns), Err(LevelError::NoSpawnPoints)));

        let flat_brush = r#"
            id = "flat"
            [[brushes]]
            center = [0.0, 0.0, 0.0]
            half_extents = [1.0, 0.0, 1.0]
            [[spawn_points]]
            position = [0.0, 0.0, 0.0]
        "#;
        assert!(matches!(
            Level::from_toml_str(flat_brush),
            Err(LevelError::InvalidBrush { index: 0, .. })
        ));

        assert!(matches!(Level::from_toml_str("id = 3"), Err(LevelError::Decode(_))));
    }
}
