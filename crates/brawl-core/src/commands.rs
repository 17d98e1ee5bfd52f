//! Host commands sent to the simulation.
//!
//! Commands are queued and processed at the start of the next frame.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::definitions::EffectApplication;
use crate::types::EntityId;

/// All host-originated actions that flow through the frame pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostCommand {
    // --- Player control ---
    /// Desired movement direction for a player; scaled by move speed.
    SetMoveInput { entity: EntityId, direction: DVec2 },
    /// Teleport an entity (host physics correction).
    SetPosition { entity: EntityId, position: DVec2 },

    // --- Combat resolution ---
    /// A host-flown projectile reached `target`.
    ProjectileHit {
        target: EntityId,
        damage: f64,
        source: Option<EntityId>,
        on_hit: Option<EffectApplication>,
        /// Echo of `ProjectileSpawn::effect_duration_scale`.
        #[serde(default = "unit_scale")]
        effect_duration_scale: f64,
    },
    /// Environmental or scripted effect application.
    ApplyEffect {
        target: EntityId,
        application: EffectApplication,
        source: Option<EntityId>,
    },
    /// Force an AI entity to flee.
    Frighten { entity: EntityId },

    // --- Lifecycle ---
    /// Remove an entity immediately.
    Despawn { entity: EntityId },

    // --- Simulation control ---
    Pause,
    Resume,
}

fn unit_scale() -> f64 {
    1.0
}
