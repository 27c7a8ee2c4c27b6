//! Collision layers and surface tags.
//!
//! Layers decide which colliders a probe can see. Tags classify the surface
//! that was hit so movement can react to it (speed ramps, bounce pads).

use serde::{Deserialize, Serialize};

/// Bit mask of collision layers.
///
/// Every collider belongs to one or more layers, and every probe carries a
/// mask. A collider is only reported when the two intersect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Matches nothing.
    pub const NONE: Self = Self(0);

    /// Static level geometry: floors, walls, ramps, pads.
    pub const WORLD: Self = Self(1 << 0);

    /// Character bodies.
    pub const CHARACTER: Self = Self(1 << 1);

    /// Blocks characters only (invisible walls).
    pub const CHARACTER_CLIP: Self = Self(1 << 2);

    /// Non-blocking volumes. Never part of a movement mask.
    pub const TRIGGER: Self = Self(1 << 3);

    /// Everything.
    pub const ALL: Self = Self(u32::MAX);

    /// Mask used by the ground, ceiling and wall probes.
    pub const MASK_MOVEMENT: Self = Self(Self::WORLD.0 | Self::CHARACTER_CLIP.0);

    /// Mask used by obstacle queries from steering code.
    pub const MASK_OBSTACLE: Self = Self(Self::WORLD.0 | Self::CHARACTER_CLIP.0 | Self::CHARACTER.0);

    /// Check if all layers of `other` are set.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any layer is shared.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Classification attached to world geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SurfaceTag {
    /// Untagged geometry. Treated like `Level` for ground contact.
    #[default]
    None,
    /// Regular level geometry. Only `Level` surfaces trigger wall sliding.
    Level,
    /// Launches the character along the ramp.
    SpeedRamp,
    /// Bounces the character off the surface.
    BouncePad,
}

impl SurfaceTag {
    /// Precedence when several ground candidates are in range.
    ///
    /// Higher wins: bounce pad, then speed ramp, then plain ground.
    #[inline]
    pub fn ground_precedence(self) -> u8 {
        match self {
            Self::BouncePad => 2,
            Self::SpeedRamp => 1,
            Self::Level | Self::None => 0,
        }
    }
}
