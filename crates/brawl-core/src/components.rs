//! ECS components for hecs entities.
//!
//! Components are plain data. Behavior lives in systems. Stats, status
//! effects, attack loadouts and brains are components too but are defined
//! next to the logic that owns them.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::Faction;
use crate::types::EntityId;

/// Identity of a combat entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub id: EntityId,
    pub faction: Faction,
    /// Enemy type name or character id.
    pub kind: String,
}

/// Liveness flags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vitality {
    /// Inactive entities are skipped by every system.
    pub active: bool,
    /// Set once when health reaches zero.
    pub dead: bool,
}

impl Default for Vitality {
    fn default() -> Self {
        Self {
            active: true,
            dead: false,
        }
    }
}

impl Vitality {
    pub fn is_alive(&self) -> bool {
        self.active && !self.dead
    }

    pub fn kill(&mut self) {
        self.dead = true;
        self.active = false;
    }
}

/// Decaying shove applied on top of voluntary velocity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Knockback {
    /// Initial impulse velocity, px/s.
    pub impulse: DVec2,
    /// Remaining lifetime, ms.
    pub remaining_ms: f64,
}

/// Marks a host-steered entity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlayerControl {
    /// Desired direction; normalized when applied.
    pub move_input: DVec2,
}
