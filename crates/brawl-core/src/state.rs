//! Read-only views the host queries after each frame.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::SimEvent;
use crate::types::{EntityId, SimTime};

/// Complete frame output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub time: SimTime,
    pub paused: bool,
    pub entities: Vec<EntityView>,
    /// Events produced during this frame, in emission order.
    pub events: Vec<SimEvent>,
}

/// One entity as the host sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub faction: Faction,
    pub kind: String,
    pub position: DVec2,
    pub velocity: DVec2,
    pub health: f64,
    pub max_health: f64,
    pub alive: bool,
    /// Current behavior state; `None` for players.
    pub behavior: Option<BehaviorStateId>,
    pub effects: Vec<EffectView>,
    pub attacks: Vec<AttackView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectView {
    pub id: String,
    pub stacks: u32,
    /// `None` for effects that last until removed.
    pub remaining_ms: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackView {
    pub id: String,
    pub kind: AttackKind,
    pub cooldown_remaining_ms: f64,
}

impl FrameSnapshot {
    pub fn entity(&self, id: EntityId) -> Option<&EntityView> {
        self.entities.iter().find(|e| e.id == id)
    }
}
