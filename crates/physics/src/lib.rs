//! Vaultrun Physics
//!
//! The deterministic movement core of a fixed-tick FPS, designed to be
//! re-run for the same tick during rollback. Identical inputs give
//! bit-identical results across runs.
//!
//! # Architecture
//!
//! The crate is split into two main systems:
//!
//! - **Collision**: tagged world geometry answering ray queries through the
//!   [`WorldProbe`] trait
//! - **Movement**: uses those queries to move a character: ground contact,
//!   slopes, walls, ceilings, speed ramps and bounce pads
//!
//! # Design Principles
//!
//! 1. **Determinism**: no clocks, no randomness, ordered probe results
//! 2. **No hidden state**: everything that changes lives in [`MovementState`]
//! 3. **No per-tick allocation**: probes share a caller-owned [`ProbeBuffer`]

pub mod collision;
pub mod math;
pub mod movement;

// Re-export commonly used types
pub use collision::{
    ColliderId, CollisionWorld, LayerMask, ProbeBuffer, ProbeRay, ProbeResult, SurfaceTag, WorldProbe,
};
pub use movement::{
    CharacterController, CollisionProbe, CommandButtons, InputCommand, MovementEvents, MovementFlags,
    MovementParameters, MovementState, ParamsError,
};
