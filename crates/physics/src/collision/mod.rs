//! World geometry queries for character movement.
//!
//! Movement only ever asks one kind of question: "what does this ray hit?".
//! The [`WorldProbe`] trait is that seam. [`CollisionWorld`] is the
//! reference implementation on top of parry3d; hosts with their own scene
//! representation implement the trait directly.
//!
//! # Key Types
//!
//! - [`WorldProbe`]: read-only ray queries against world geometry
//! - [`ProbeResult`]: one hit, with distance, normal and [`SurfaceTag`]
//! - [`ProbeBuffer`]: reusable scratch storage for hits
//! - [`LayerMask`]: collision layer filtering

mod flags;
mod probe;
mod world;

pub use flags::{LayerMask, SurfaceTag};
pub use probe::{ColliderId, ProbeBuffer, ProbeRay, ProbeResult, WorldProbe, DEFAULT_PROBE_CAPACITY};
pub use world::{Collider, CollisionWorld};
