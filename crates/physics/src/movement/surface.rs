//! Surface effects for speed ramps and bounce pads.
//!
//! The classifier is purely reactive: it looks at the accepted ground or wall
//! hit for this tick and says what it does to the character. Whether the
//! effect actually fires (edge triggering through `boosted` and
//! `bounce_pad_wall_active`) is the controller's call.

use glam::Vec3;

use crate::collision::{ProbeResult, SurfaceTag};
use crate::math::horizontal;

use super::config::MovementParameters;

/// World up.
pub const UP: Vec3 = Vec3::Y;

/// Launch speed along a speed ramp.
pub const SPEED_RAMP_LAUNCH: f32 = 75.0;

/// Push-off speed along a bounce pad normal.
pub const BOUNCE_PAD_PUSH: f32 = 50.0;

/// Effect of the accepted ground contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEffect {
    /// Plain ground: land and walk.
    Normal,
    /// Launch along the ramp; starts sliding.
    SpeedRamp { boost: Vec3 },
    /// Bounce off the pad, keeping horizontal velocity.
    BouncePad { boost: Vec3 },
}

/// Effect of the wall ahead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WallEffect {
    /// No qualifying wall.
    None,
    /// Level wall: slide along it.
    Slide { normal: Vec3 },
    /// Wall bounce pad: bounce off it.
    BouncePad { boost: Vec3 },
}

/// Vertical boost speeds for pads and ramps.
///
/// Holding jump when touching a special surface rewards the timing: the pad
/// term becomes ten times larger and the ramp term doubles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostSpeeds {
    /// Pad vertical term, before the division by ten.
    pub pad: f32,
    /// Ramp vertical term, before the division by ten.
    pub ramp: f32,
}

impl BoostSpeeds {
    pub fn new(jump_speed: f32, wish_jump: bool) -> Self {
        let mut pad = jump_speed;
        let mut ramp = jump_speed * 10.0;
        if wish_jump {
            pad *= 10.0;
            ramp *= 2.0;
        }
        Self { pad, ramp }
    }
}

/// `cross(normal, -right) × 75 + ramp / 10 × up`.
#[inline]
pub fn speed_ramp_boost(normal: Vec3, surface_right: Vec3, ramp_speed: f32) -> Vec3 {
    normal.cross(-surface_right) * SPEED_RAMP_LAUNCH + UP * (ramp_speed / 10.0)
}

/// `normal × 50 + pad / 10 × up + horizontal velocity`.
#[inline]
pub fn ground_pad_boost(normal: Vec3, pad_speed: f32, velocity: Vec3) -> Vec3 {
    normal * BOUNCE_PAD_PUSH + UP * (pad_speed / 10.0) + horizontal(velocity)
}

/// `normal × 50 + jump_speed × up`.
#[inline]
pub fn wall_pad_boost(normal: Vec3, jump_speed: f32) -> Vec3 {
    normal * BOUNCE_PAD_PUSH + UP * jump_speed
}

/// Maps probe hits to surface effects.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceClassifier<'a> {
    params: &'a MovementParameters,
}

impl<'a> SurfaceClassifier<'a> {
    pub fn new(params: &'a MovementParameters) -> Self {
        Self { params }
    }

    /// Classify the accepted ground contact.
    pub fn classify_ground(&self, hit: &ProbeResult, wish_jump: bool, velocity: Vec3) -> SurfaceEffect {
        let speeds = BoostSpeeds::new(self.params.jump_speed, wish_jump);
        match hit.surface_tag {
            SurfaceTag::SpeedRamp => SurfaceEffect::SpeedRamp {
                boost: speed_ramp_boost(hit.normal, hit.surface_right, speeds.ramp),
            },
            SurfaceTag::BouncePad => SurfaceEffect::BouncePad {
                boost: ground_pad_boost(hit.normal, speeds.pad, velocity),
            },
            SurfaceTag::Level | SurfaceTag::None => SurfaceEffect::Normal,
        }
    }

    /// Classify the nearest hit along the velocity.
    ///
    /// Only non-walkable surfaces count as walls, so floors met while falling
    /// are left to the ground query.
    pub fn classify_wall(&self, hit: &ProbeResult) -> WallEffect {
        if self.params.is_walkable(hit.slope_angle_degrees(UP)) {
            return WallEffect::None;
        }

        match hit.surface_tag {
            SurfaceTag::Level => WallEffect::Slide { normal: hit.normal },
            SurfaceTag::BouncePad => WallEffect::BouncePad {
                boost: wall_pad_boost(hit.normal, self.params.jump_speed),
            },
            SurfaceTag::SpeedRamp | SurfaceTag::None => WallEffect::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(tag: SurfaceTag, normal: Vec3) -> ProbeResult {
        ProbeResult {
            hit: true,
            distance: 1.0,
            normal,
            surface_tag: tag,
            collider: 0,
            ..ProbeResult::miss()
        }
    }

    #[test]
    fn test_speed_ramp_boost_on_flat_ramp() {
        let params = MovementParameters::default();
        let classifier = SurfaceClassifier::new(&params);

        let ramp = ProbeResult {
            surface_right: Vec3::X,
            ..hit(SurfaceTag::SpeedRamp, Vec3::Y)
        };
        let effect = classifier.classify_ground(&ramp, false, Vec3::ZERO);
        let expected = Vec3::new(0.0, params.jump_speed, 75.0);
        match effect {
            SurfaceEffect::SpeedRamp { boost } => assert!((boost - expected).length() < 1e-4, "{boost:?}"),
            other => panic!("expected ramp, got {other:?}"),
        }
    }

    #[test]
    fn test_queued_jump_amplifies_boosts() {
        let speeds = BoostSpeeds::new(8.0, false);
        assert_eq!(speeds, BoostSpeeds { pad: 8.0, ramp: 80.0 });

        let speeds = BoostSpeeds::new(8.0, true);
        assert_eq!(speeds, BoostSpeeds { pad: 80.0, ramp: 160.0 });
    }

    #[test]
    fn test_ground_pad_keeps_horizontal_velocity() {
        let params = MovementParameters::default();
        let classifier = SurfaceClassifier::new(&params);

        let velocity = Vec3::new(3.0, -12.0, 4.0);
        let effect = classifier.classify_ground(&hit(SurfaceTag::BouncePad, Vec3::Y), false, velocity);
        let expected = Vec3::new(3.0, 50.0 + params.jump_speed / 10.0, 4.0);
        match effect {
            SurfaceEffect::BouncePad { boost } => assert!((boost - expected).length() < 1e-4, "{boost:?}"),
            other => panic!("expected pad, got {other:?}"),
        }
    }

    #[test]
    fn test_level_ground_is_normal() {
        let params = MovementParameters::default();
        let classifier = SurfaceClassifier::new(&params);
        assert_eq!(
            classifier.classify_ground(&hit(SurfaceTag::Level, Vec3::Y), true, Vec3::ONE),
            SurfaceEffect::Normal
        );
        assert_eq!(
            classifier.classify_ground(&hit(SurfaceTag::None, Vec3::Y), false, Vec3::ONE),
            SurfaceEffect::Normal
        );
    }

    #[test]
    fn test_wall_classification() {
        let params = MovementParameters::default();
        let classifier = SurfaceClassifier::new(&params);

        assert_eq!(
            classifier.classify_wall(&hit(SurfaceTag::Level, Vec3::NEG_X)),
            WallEffect::Slide { normal: Vec3::NEG_X }
        );
        assert_eq!(
            classifier.classify_wall(&hit(SurfaceTag::BouncePad, Vec3::NEG_X)),
            WallEffect::BouncePad {
                boost: Vec3::new(-50.0, params.jump_speed, 0.0)
            }
        );

        // Floors are never walls
        assert_eq!(classifier.classify_wall(&hit(SurfaceTag::Level, Vec3::Y)), WallEffect::None);
        assert_eq!(classifier.classify_wall(&hit(SurfaceTag::BouncePad, Vec3::Y)), WallEffect::None);
        assert_eq!(classifier.classify_wall(&hit(SurfaceTag::SpeedRamp, Vec3::NEG_X)), WallEffect::None);
    }
}
