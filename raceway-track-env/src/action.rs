//! Discrete driving actions.
use serde::{Deserialize, Serialize};

/// Longitudinal component of a driving action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Throttle {
    /// Accelerate forward up to the maximum velocity.
    Accelerate,

    /// Accelerate backward up to half the maximum velocity.
    Reverse,

    /// Accelerate forward at triple rate up to the boost velocity.
    Boost,

    /// No throttle input; the car coasts and slowly loses speed.
    Idle,
}

/// Lateral component of a driving action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Steering {
    /// Rotate counterclockwise.
    Left,

    /// Rotate clockwise.
    Right,

    /// Keep the current heading.
    Straight,
}

/// One of the twelve discrete commands the agent can issue.
///
/// The variants enumerate every combination of [`Throttle`] and
/// [`Steering`]. The order of [`DriveAction::ALL`] defines the action
/// indices used across the system: the explorer's action-space size, the
/// network's output dimension and the motion mapping all derive from this
/// single enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum DriveAction {
    /// Accelerate straight ahead.
    Forward,
    /// Accelerate backward.
    Backward,
    /// Turn left while coasting.
    Left,
    /// Turn right while coasting.
    Right,
    /// Boost straight ahead.
    Boost,
    /// Accelerate and turn left.
    ForwardLeft,
    /// Accelerate and turn right.
    ForwardRight,
    /// Accelerate backward and turn left.
    BackLeft,
    /// Accelerate backward and turn right.
    BackRight,
    /// Boost and turn left.
    BoostLeft,
    /// Boost and turn right.
    BoostRight,
    /// Coast without steering.
    Sit,
}

impl DriveAction {
    /// All actions, in the order their indices enumerate them.
    pub const ALL: [DriveAction; 12] = [
        DriveAction::Forward,
        DriveAction::Backward,
        DriveAction::Left,
        DriveAction::Right,
        DriveAction::Boost,
        DriveAction::ForwardLeft,
        DriveAction::ForwardRight,
        DriveAction::BackLeft,
        DriveAction::BackRight,
        DriveAction::BoostLeft,
        DriveAction::BoostRight,
        DriveAction::Sit,
    ];

    /// Returns the action with the given index.
    pub fn from_index(ix: usize) -> Option<DriveAction> {
        Self::ALL.get(ix).copied()
    }

    /// Returns the index of this action.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|a| *a == self).unwrap()
    }

    /// Returns the longitudinal component of this action.
    pub fn throttle(self) -> Throttle {
        match self {
            DriveAction::Forward | DriveAction::ForwardLeft | DriveAction::ForwardRight => {
                Throttle::Accelerate
            }
            DriveAction::Backward | DriveAction::BackLeft | DriveAction::BackRight => {
                Throttle::Reverse
            }
            DriveAction::Boost | DriveAction::BoostLeft | DriveAction::BoostRight => {
                Throttle::Boost
            }
            DriveAction::Left | DriveAction::Right | DriveAction::Sit => Throttle::Idle,
        }
    }

    /// Returns the lateral component of this action.
    pub fn steering(self) -> Steering {
        match self {
            DriveAction::Left | DriveAction::ForwardLeft | DriveAction::BackLeft
            | DriveAction::BoostLeft => Steering::Left,
            DriveAction::Right | DriveAction::ForwardRight | DriveAction::BackRight
            | DriveAction::BoostRight => Steering::Right,
            DriveAction::Forward | DriveAction::Backward | DriveAction::Boost
            | DriveAction::Sit => Steering::Straight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrip() {
        for (ix, action) in DriveAction::ALL.iter().enumerate() {
            assert_eq!(action.index(), ix);
            assert_eq!(DriveAction::from_index(ix), Some(*action));
        }
        assert_eq!(DriveAction::from_index(DriveAction::ALL.len()), None);
    }

    #[test]
    fn every_throttle_steering_pair_appears_once() {
        let throttles = [
            Throttle::Accelerate,
            Throttle::Reverse,
            Throttle::Boost,
            Throttle::Idle,
        ];
        let steerings = [Steering::Left, Steering::Right, Steering::Straight];

        for t in throttles.iter() {
            for s in steerings.iter() {
                let n = DriveAction::ALL
                    .iter()
                    .filter(|a| a.throttle() == *t && a.steering() == *s)
                    .count();
                assert_eq!(n, 1, "missing or duplicated pair {:?}/{:?}", t, s);
            }
        }
    }
}
