//! Behavioral flags contributed by status effects.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Behavioral restrictions an effect imposes on its carrier.
    ///
    /// The union over all live effects is what the behavior and combat
    /// layers consult.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct BehaviorFlags: u8 {
        /// No movement and no attacks.
        const STUNNED = 1 << 0;
        /// No voluntary movement; attacks still allowed.
        const ROOTED = 1 << 1;
        /// Attacks fail; movement still allowed.
        const DISARMED = 1 << 2;
    }
}

impl BehaviorFlags {
    /// Map a definition flag name to its bit. Unknown names yield `None`.
    pub fn from_definition_key(name: &str) -> Option<Self> {
        match name {
            "isStunned" | "stunned" | "stun" => Some(Self::STUNNED),
            "isRooted" | "rooted" | "root" => Some(Self::ROOTED),
            "isDisarmed" | "disarmed" => Some(Self::DISARMED),
            _ => None,
        }
    }

    pub fn can_move(self) -> bool {
        !self.intersects(Self::STUNNED | Self::ROOTED)
    }

    pub fn can_attack(self) -> bool {
        !self.intersects(Self::STUNNED | Self::DISARMED)
    }
}
