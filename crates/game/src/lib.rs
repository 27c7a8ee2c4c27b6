//! Vaultrun Game Logic
//!
//! This crate hosts the movement core:
//!
//! - Character state, spawning and respawning
//! - Input conversion
//! - Level loading
//! - Rollback history and state snapshots
//!
//! # Architecture
//!
//! The simulation is deterministic and steps every character once per fixed
//! tick, in id order. Snapshots of past ticks let a client rewind and re-run
//! them when corrected inputs arrive.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Simulation                           │
//! │  ┌──────────┐    ┌───────────────┐    ┌───────────────────┐  │
//! │  │ Player   │───►│ Movement core │───►│ Characters, level │  │
//! │  │ inputs   │    │ (per tick)    │    │ colliders         │  │
//! │  └──────────┘    └───────┬───────┘    └─────────┬─────────┘  │
//! │                          ▼                      ▼            │
//! │                  Movement listeners     Tick history ring    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod character;
pub mod input;
pub mod level;
pub mod simulation;
pub mod snapshot;

// Re-export main types
pub use character::{Character, CharacterId};
pub use input::PlayerInput;
pub use level::{Level, LevelError};
pub use simulation::{MovementListener, RollbackError, Simulation, SimulationConfig, SimulationError};
pub use snapshot::{SnapshotError, WorldSnapshot};

// Re-export physics types for convenience
pub use vaultrun_physics::{
    CharacterController, CollisionWorld, InputCommand, MovementEvents, MovementParameters, MovementState, SurfaceTag,
};
