//! Character movement.
//!
//! This module implements Quake-style FPS movement with:
//!
//! - Ground and air solvers with friction, acceleration and air control
//! - Slope classification and plane-following motion
//! - Jump queuing and crouch toggling
//! - Speed ramps and bounce pads
//! - Wall sliding
//!
//! # Design
//!
//! Movement is driven by the [`CharacterController`], which takes one
//! [`InputCommand`] per tick and updates a [`MovementState`] through a
//! [`CollisionProbe`].
//!
//! The step never reads time or randomness, so the same inputs always
//! produce the same outputs and a tick can be re-run during rollback.

mod config;
mod controller;
mod events;
mod integrator;
pub mod jump;
mod probe;
pub mod slide;
mod state;
mod surface;

pub use config::{MovementParameters, ParamsError};
pub use controller::CharacterController;
pub use events::{detect_transitions, MovementEvents};
pub use integrator::{effective_velocity, wish_velocity, MovementIntegrator};
pub use probe::{CollisionProbe, GroundProbe};
pub use slide::{ground_check, slide_on_obstacle, wall_slide, GroundCheck, SlideOnObstacle};
pub use state::{CommandButtons, GroundHit, InputCommand, MoveCommand, MovementFlags, MovementState, SlopeState};
pub use surface::{BoostSpeeds, SurfaceClassifier, SurfaceEffect, WallEffect, UP};
