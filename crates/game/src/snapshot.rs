//! Binary snapshots of the simulation state.
//!
//! Snapshots back rollback and bit-identity checks between runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::character::Character;

/// Errors that can occur during encoding/decoding.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("{0} trailing bytes after snapshot")]
    TrailingBytes(usize),
}

/// Everything that changes from tick to tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Tick the snapshot was taken at, before that tick ran.
    pub tick: u64,

    /// Characters in id order.
    pub characters: Vec<Character>,
}

/// Encode a snapshot to bytes.
pub fn encode(snapshot: &WorldSnapshot) -> Result<Vec<u8>, SnapshotError> {
    Ok(bincode::serde::encode_to_vec(snapshot, bincode::config::standard())?)
}

/// Decode a snapshot from bytes.
pub fn decode(data: &[u8]) -> Result<WorldSnapshot, SnapshotError> {
    let (snapshot, read) = bincode::serde::decode_from_slice(data, bincode::config::standard())?;
    if read != data.len() {
        return Err(SnapshotError::TrailingBytes(data.len() - read));
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use vaultrun_physics::{MovementFlags, MovementState};

    fn sample() -> WorldSnapshot {
        let mut movement = MovementState::new(Vec3::new(1.5, 2.0, -3.25));
        movement.velocity = Vec3::new(0.1, -7.0, 19.9);
        movement.yaw = 271.5;
        movement.flags.set(MovementFlags::BOOSTED, true);

        let mut dead = Character::new(2, "b".to_string(), MovementState::new(Vec3::ZERO), 5);
        dead.kill(12);

        WorldSnapshot {
            tick: 42,
            characters: vec![Character::new(1, "a".to_string(), movement, 4), dead],
        }
    }

    #[test]
    fn test_snapshot_is_exact() {
        let snapshot = sample();
        let decoded = decode(&encode(&snapshot).unwrap()).unwrap();

        assert_eq!(decoded, snapshot);
        let (a, b) = (&decoded.characters[0].movement, &snapshot.characters[0].movement);
        assert_eq!(a.velocity.y.to_bits(), b.velocity.y.to_bits());
        assert_eq!(decoded.characters[1].respawn_ticks(), 12);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let mut bytes = encode(&sample()).unwrap();
        bytes.push(0);
        assert!(matches!(decode(&bytes), Err(SnapshotError::TrailingBytes(1))));

        assert!(decode(&[0xff, 0xff]).is_err());
    }
}
