//! Behavior hooks of each effect type.

use brawl_core::types::EntityId;

use super::EffectTarget;

/// Type-specific behavior of a live effect.
///
/// Stat modifiers and flags are carried by every effect and handled by the
/// engine; variants only add what runs on top of them.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectBehavior {
    /// Contributes modifiers and flags only.
    Passive,
    /// Deals `damage_per_tick` per stack on every periodic tick.
    DamageOverTime { damage_per_tick: f64 },
    /// Pins velocity at zero while active.
    Stun,
}

impl EffectBehavior {
    pub fn on_apply(&self, target: &mut EffectTarget<'_>) {
        if let EffectBehavior::Stun = self {
            target.velocity.stop();
        }
    }

    pub fn on_update(&self, target: &mut EffectTarget<'_>, _delta: f64) {
        if let EffectBehavior::Stun = self {
            target.velocity.stop();
        }
    }

    pub fn on_tick(&self, target: &mut EffectTarget<'_>, stacks: u32, source: Option<EntityId>) {
        if let EffectBehavior::DamageOverTime { damage_per_tick } = *self {
            if target.vitality.active && target.stats.health() > 0.0 {
                target.take_damage(damage_per_tick * f64::from(stacks.max(1)), source);
            }
        }
    }

    pub fn on_remove(&self, _target: &mut EffectTarget<'_>) {}
}
