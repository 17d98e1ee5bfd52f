//! Intents produced by combat resolution and events emitted to the host.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::definitions::EffectApplication;
use crate::enums::*;
use crate::types::EntityId;

/// A deferred world mutation produced while resolving an attack.
///
/// Intents are delivered once, in production order, after all behavior
/// updates of the frame have run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Intent {
    /// Deal damage through the target's mitigation.
    Damage {
        target: EntityId,
        amount: f64,
        source: Option<EntityId>,
    },
    /// Shove the target along `direction`.
    Knockback {
        target: EntityId,
        direction: DVec2,
        force: f64,
    },
    /// Apply a status effect. Duration is scaled by `duration_scale`.
    ApplyEffect {
        target: EntityId,
        application: EffectApplication,
        source: Option<EntityId>,
        duration_scale: f64,
    },
    /// Ask the host to launch a projectile.
    SpawnProjectile(ProjectileSpawn),
}

/// Everything the host needs to fly and resolve one projectile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSpawn {
    pub shooter: EntityId,
    pub faction: Faction,
    pub attack_id: String,
    pub projectile_type: String,
    /// Launch point: shooter position plus the origin offset.
    pub origin: DVec2,
    /// Unit heading.
    pub direction: DVec2,
    /// Speed, px/s.
    pub speed: f64,
    /// Damage after the shooter's damage modifier.
    pub damage: f64,
    /// Flight time before the projectile expires, ms.
    pub lifespan_ms: f64,
    /// Sprite scale from the projectile size modifier.
    pub scale: f64,
    pub knockback_force: f64,
    /// Lingering area radius for area-denial shots.
    pub area_radius: Option<f64>,
    /// Lingering area lifetime, ms.
    pub area_duration_ms: Option<f64>,
    /// Effect to apply on impact.
    pub on_hit: Option<EffectApplication>,
    /// Shooter's effect duration modifier at launch.
    pub effect_duration_scale: f64,
}

/// Notifications emitted to the host at the end of each frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// Health was removed from an entity.
    DamageTaken {
        target: EntityId,
        amount: f64,
        remaining: f64,
        source: Option<EntityId>,
    },
    /// Health reached zero. Emitted exactly once per entity.
    Died {
        entity: EntityId,
        killer: Option<EntityId>,
        xp_value: f64,
    },
    /// A status effect was added or stacked.
    EffectApplied {
        entity: EntityId,
        effect_id: String,
        stacks: u32,
    },
    /// A status effect expired or was removed.
    EffectRemoved { entity: EntityId, effect_id: String },
    /// Current stats were rebuilt.
    StatsChanged {
        entity: EntityId,
        health: f64,
        max_health: f64,
    },
    /// An AI entity changed behavior state.
    StateChanged {
        entity: EntityId,
        from: Option<BehaviorStateId>,
        to: BehaviorStateId,
    },
    /// An attack left cooldown and executed.
    AttackFired {
        entity: EntityId,
        attack_id: String,
        kind: AttackKind,
    },
    /// The host should launch this projectile.
    ProjectileSpawned(ProjectileSpawn),
    /// An entity was shoved.
    KnockedBack { entity: EntityId, impulse: DVec2 },
    Spawned { entity: EntityId, faction: Faction },
    Despawned { entity: EntityId },
}
