//! Deterministic math helpers for facing and plane projection.
//!
//! Hardware and libm implementations of trig functions differ between
//! architectures (x86 vs ARM vs WASM). Facing vectors feed straight into
//! velocity, so they use software approximations that produce identical
//! results on every peer.

use std::f32::consts::PI;

use glam::Vec3;

/// Deterministic sine using polynomial approximation.
/// Input in radians, returns value in [-1, 1].
///
/// Uses Bhaskara I's approximation, accurate to ~0.001.
#[inline]
pub fn sin_det(x: f32) -> f32 {
    let x = normalize_angle(x);

    // Use symmetry to map to [0, π]
    let (x, sign) = if x > PI { (x - PI, -1.0) } else { (x, 1.0) };

    // sin(x) ≈ 16x(π-x) / (5π² - 4x(π-x)) for x in [0, π]
    let numerator = 16.0 * x * (PI - x);
    let denominator = 5.0 * PI * PI - 4.0 * x * (PI - x);

    sign * numerator / denominator
}

/// Deterministic cosine using polynomial approximation.
#[inline]
pub fn cos_det(x: f32) -> f32 {
    sin_det(x + PI / 2.0)
}

/// Normalize angle to [0, 2π).
#[inline]
fn normalize_angle(x: f32) -> f32 {
    const TWO_PI: f32 = 2.0 * PI;
    let x = x % TWO_PI;
    if x < 0.0 {
        x + TWO_PI
    } else {
        x
    }
}

/// Wrap an angle in degrees to [0, 360).
#[inline]
pub fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Horizontal forward vector for a yaw in degrees.
///
/// Yaw 0 faces +Z, yaw 90 faces +X (clockwise seen from above).
#[inline]
pub fn yaw_forward(yaw_degrees: f32) -> Vec3 {
    let radians = yaw_degrees.to_radians();
    Vec3::new(sin_det(radians), 0.0, cos_det(radians))
}

/// Horizontal right vector for a yaw in degrees.
#[inline]
pub fn yaw_right(yaw_degrees: f32) -> Vec3 {
    let radians = yaw_degrees.to_radians();
    Vec3::new(cos_det(radians), 0.0, -sin_det(radians))
}

/// Remove the component of `vector` along `normal`.
///
/// `normal` is normalized first; a degenerate normal leaves the vector
/// unchanged.
#[inline]
pub fn project_on_plane(vector: Vec3, normal: Vec3) -> Vec3 {
    let n = normal.normalize_or_zero();
    vector - n * vector.dot(n)
}

/// The vector with its vertical component removed.
#[inline]
pub fn horizontal(vector: Vec3) -> Vec3 {
    Vec3::new(vector.x, 0.0, vector.z)
}
