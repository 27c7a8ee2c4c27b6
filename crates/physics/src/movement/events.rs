//! Per-tick movement transition events.

use serde::{Deserialize, Serialize};

use super::state::MovementState;

/// Set of transitions that happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementEvents(pub u16);

impl MovementEvents {
    pub const LANDED: u16 = 1 << 0;
    pub const LEFT_GROUND: u16 = 1 << 1;
    pub const JUMPED: u16 = 1 << 2;
    pub const CROUCHED: u16 = 1 << 3;
    pub const STOOD_UP: u16 = 1 << 4;
    /// A ramp or ground pad boost started.
    pub const BOOSTED: u16 = 1 << 5;
    pub const CEILING_HIT: u16 = 1 << 6;
    pub const WALL_BOUNCE: u16 = 1 << 7;

    const NAMES: [(u16, &'static str); 8] = [
        (Self::LANDED, "landed"),
        (Self::LEFT_GROUND, "left_ground"),
        (Self::JUMPED, "jumped"),
        (Self::CROUCHED, "crouched"),
        (Self::STOOD_UP, "stood_up"),
        (Self::BOOSTED, "boosted"),
        (Self::CEILING_HIT, "ceiling_hit"),
        (Self::WALL_BOUNCE, "wall_bounce"),
    ];

    #[inline]
    pub fn has(self, event: u16) -> bool {
        (self.0 & event) != 0
    }

    #[inline]
    pub fn insert(&mut self, event: u16) {
        self.0 |= event;
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Names of the events in the set, in bit order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .into_iter()
            .filter(move |(bit, _)| self.has(*bit))
            .map(|(_, name)| name)
    }
}

impl std::ops::BitOr for MovementEvents {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for MovementEvents {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Compare flags before and after a tick.
///
/// Jumps and wall bounces are reported by the controller as they happen,
/// since their flags can be set and cleared within one tick.
pub fn detect_transitions(previous: &MovementState, current: &MovementState) -> MovementEvents {
    let (before, after) = (previous.flags, current.flags);
    let mut events = MovementEvents::default();

    if !before.grounded() && after.grounded() {
        events.insert(MovementEvents::LANDED);
    }
    if before.grounded() && !after.grounded() {
        events.insert(MovementEvents::LEFT_GROUND);
    }
    if !before.crouched() && after.crouched() {
        events.insert(MovementEvents::CROUCHED);
    }
    if before.crouched() && !after.crouched() {
        events.insert(MovementEvents::STOOD_UP);
    }
    if !before.boosted() && after.boosted() {
        events.insert(MovementEvents::BOOSTED);
    }
    if !before.hit_ceiling() && after.hit_ceiling() {
        events.insert(MovementEvents::CEILING_HIT);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::state::MovementFlags;
    use glam::Vec3;

    #[test]
    fn test_landing_and_crouch() {
        let previous = MovementState::new(Vec3::ZERO);
        let mut current = previous.clone();
        current.flags.set(MovementFlags::GROUNDED, true);
        current.flags.set(MovementFlags::CROUCHED, true);

        let events = detect_transitions(&previous, &current);
        assert!(events.has(MovementEvents::LANDED));
        assert!(events.has(MovementEvents::CROUCHED));
        assert!(!events.has(MovementEvents::LEFT_GROUND));

        let events = detect_transitions(&current, &previous);
        assert!(events.has(MovementEvents::LEFT_GROUND));
        assert!(events.has(MovementEvents::STOOD_UP));
    }

    #[test]
    fn test_no_change_no_events() {
        let mut state = MovementState::new(Vec3::ZERO);
        state.flags.set(MovementFlags::BOOSTED, true);
        assert!(detect_transitions(&state, &state).is_empty());
    }

    #[test]
    fn test_names() {
        let events = MovementEvents(MovementEvents::JUMPED | MovementEvents::WALL_BOUNCE);
        let names: Vec<_> = events.names().collect();
        assert_eq!(names, vec!["jumped", "wall_bounce"]);
    }
}
