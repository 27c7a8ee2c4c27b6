//! Movement parameters.
//!
//! All tuning values for one character are grouped here. Values are in world
//! units and seconds; they follow Quake 3 CPM conventions scaled for a
//! character whose half height is one unit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating [`MovementParameters`].
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("parameter `{name}` must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },

    #[error("parameter `{name}` must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("parameter `{name}` must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },

    #[error("max slope angle must be in (0, 90) degrees, got {0}")]
    SlopeAngle(f32),

    #[error("failed to decode movement parameters: {0}")]
    Decode(#[from] toml::de::Error),
}

/// Immutable per-character movement configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementParameters {
    // ========================================================================
    // Ground
    // ========================================================================
    /// Target ground speed (units/second).
    pub move_speed: f32,

    /// Ground acceleration factor.
    pub run_acceleration: f32,

    /// Friction control floor. Below this speed, friction acts as if moving
    /// at this speed so the character comes to a full stop.
    pub run_deceleration: f32,

    /// Ground friction coefficient.
    pub friction: f32,

    // ========================================================================
    // Air
    // ========================================================================
    /// Air acceleration when not opposing current velocity.
    pub air_acceleration: f32,

    /// Air acceleration when opposing current velocity.
    pub air_deceleration: f32,

    /// Wish speed cap while only strafing in the air.
    pub side_strafe_speed: f32,

    /// Acceleration while only strafing in the air.
    pub side_strafe_acceleration: f32,

    /// CPM air control strength (0 disables).
    pub air_control: f32,

    /// Gravity (units/second²).
    pub gravity: f32,

    /// Vertical speed applied by a jump.
    pub jump_speed: f32,

    /// Horizontal speed clamp per axis, ignored while boosted or sliding.
    pub max_horizontal_speed: f32,

    /// Acceleration is skipped entirely at or above this speed.
    pub acceleration_speed_cap: f32,

    // ========================================================================
    // Probe geometry
    // ========================================================================
    /// Steepest walkable slope (degrees from up, exclusive).
    pub max_slope_angle_degrees: f32,

    /// Distance from the character center to its base.
    pub half_height: f32,

    /// Ground probe reach past the base, as a fraction of half height.
    pub ground_probe_epsilon: f32,

    /// Ceiling probe reach past the top of the character.
    pub ceiling_probe_margin: f32,

    /// Wall probe length along the velocity direction.
    pub wall_probe_distance: f32,
}

impl Default for MovementParameters {
    fn default() -> Self {
        Self {
            move_speed: 20.0,
            run_acceleration: 10.0,
            run_deceleration: 10.0,
            friction: 6.0,

            air_acceleration: 2.0,
            air_deceleration: 2.0,
            side_strafe_speed: 1.0,
            side_strafe_acceleration: 50.0,
            air_control: 0.3,
            gravity: 20.0,
            jump_speed: 8.0,
            max_horizontal_speed: 30.0,
            acceleration_speed_cap: 100.0,

            max_slope_angle_degrees: 80.0,
            half_height: 1.0,
            ground_probe_epsilon: 0.01,
            ceiling_probe_margin: 0.1,
            wall_probe_distance: 2.5,
        }
    }
}

impl MovementParameters {
    /// Tighter air control and a lower clamp for slower-paced modes.
    pub fn grounded_arena() -> Self {
        Self {
            move_speed: 12.0,
            air_control: 0.1,
            max_horizontal_speed: 18.0,
            jump_speed: 6.0,
            ..Default::default()
        }
    }

    /// Loose air control for movement-focused modes.
    pub fn air_strafe() -> Self {
        Self {
            air_acceleration: 4.0,
            air_control: 1.0,
            side_strafe_acceleration: 70.0,
            max_horizontal_speed: 45.0,
            ..Default::default()
        }
    }

    /// Decode parameters from TOML and validate them.
    ///
    /// Missing fields take their default values.
    pub fn from_toml_str(source: &str) -> Result<Self, ParamsError> {
        let params: Self = toml::from_str(source)?;
        params.validate()?;
        Ok(params)
    }

    /// Check parameter preconditions.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let positive = [
            ("move_speed", self.move_speed),
            ("half_height", self.half_height),
            ("wall_probe_distance", self.wall_probe_distance),
            ("acceleration_speed_cap", self.acceleration_speed_cap),
            ("max_horizontal_speed", self.max_horizontal_speed),
        ];
        let non_negative = [
            ("run_acceleration", self.run_acceleration),
            ("run_deceleration", self.run_deceleration),
            ("friction", self.friction),
            ("air_acceleration", self.air_acceleration),
            ("air_deceleration", self.air_deceleration),
            ("side_strafe_speed", self.side_strafe_speed),
            ("side_strafe_acceleration", self.side_strafe_acceleration),
            ("air_control", self.air_control),
            ("gravity", self.gravity),
            ("jump_speed", self.jump_speed),
            ("ground_probe_epsilon", self.ground_probe_epsilon),
            ("ceiling_probe_margin", self.ceiling_probe_margin),
        ];

        for &(name, value) in positive.iter().chain(non_negative.iter()) {
            if !value.is_finite() {
                return Err(ParamsError::NotFinite { name, value });
            }
        }
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ParamsError::NotPositive { name, value });
            }
        }
        for (name, value) in non_negative {
            if value < 0.0 {
                return Err(ParamsError::Negative { name, value });
            }
        }

        let slope = self.max_slope_angle_degrees;
        if !(slope > 0.0 && slope < 90.0) {
            return Err(ParamsError::SlopeAngle(slope));
        }

        Ok(())
    }

    /// Ground contact probe length from the character center.
    #[inline]
    pub fn ground_probe_distance(&self) -> f32 {
        self.half_height * (1.0 + self.ground_probe_epsilon)
    }

    /// Slope candidate search length from the character center.
    #[inline]
    pub fn slope_search_distance(&self) -> f32 {
        self.ground_probe_distance() + self.max_slope_angle_degrees.to_radians().sin() * self.half_height
    }

    /// Ceiling probe length from the character center.
    #[inline]
    pub fn ceiling_probe_distance(&self) -> f32 {
        self.half_height + self.ceiling_probe_margin
    }

    /// Whether a surface at `angle_degrees` from up can be walked on.
    #[inline]
    pub fn is_walkable(&self, angle_degrees: f32) -> bool {
        angle_degrees < self.max_slope_angle_degrees
    }
}
