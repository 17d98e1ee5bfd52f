//! Intent delivery: applies the frame's deferred combat mutations in the
//! order they were produced. Each intent is delivered at most once.

use std::collections::HashMap;

use hecs::{Entity, World};
use tracing::debug;

use brawl_core::components::{Knockback, Vitality};
use brawl_core::constants::KNOCKBACK_DURATION_MS;
use brawl_core::definitions::DefinitionProvider;
use brawl_core::events::{Intent, SimEvent};
use brawl_core::stats::Stats;
use brawl_core::types::{EntityId, Velocity};

use crate::combat::damage::apply_damage;
use crate::effects::registry::EffectTypeRegistry;
use crate::effects::{EffectTarget, StatusEffects};

#[allow(clippy::too_many_arguments)]
pub fn deliver(
    world: &mut World,
    index: &HashMap<EntityId, Entity>,
    definitions: &dyn DefinitionProvider,
    effect_types: &EffectTypeRegistry,
    now: f64,
    intents: &mut Vec<Intent>,
    events: &mut Vec<SimEvent>,
) {
    for intent in intents.drain(..) {
        match intent {
            Intent::Damage {
                target,
                amount,
                source,
            } => {
                let Some(entity) = resolve(index, target) else {
                    continue;
                };
                if let Ok((stats, vitality)) =
                    world.query_one_mut::<(&mut Stats, &mut Vitality)>(entity)
                {
                    apply_damage(target, stats, vitality, amount, source, events);
                }
            }
            Intent::Knockback {
                target,
                direction,
                force,
            } => {
                let Some(entity) = resolve(index, target) else {
                    continue;
                };
                if let Ok((vitality, knockback)) =
                    world.query_one_mut::<(&Vitality, &mut Knockback)>(entity)
                {
                    if !vitality.active {
                        continue;
                    }
                    knockback.impulse = direction.normalize_or_zero() * force;
                    knockback.remaining_ms = KNOCKBACK_DURATION_MS;
                    events.push(SimEvent::KnockedBack {
                        entity: target,
                        impulse: knockback.impulse,
                    });
                }
            }
            Intent::ApplyEffect {
                target,
                application,
                source,
                duration_scale,
            } => {
                let Some(entity) = resolve(index, target) else {
                    continue;
                };
                if let Ok((stats, velocity, vitality, effects)) = world.query_one_mut::<(
                    &mut Stats,
                    &mut Velocity,
                    &mut Vitality,
                    &mut StatusEffects,
                )>(entity)
                {
                    let mut effect_target = EffectTarget {
                        id: target,
                        stats,
                        velocity,
                        vitality,
                        events: &mut *events,
                    };
                    effects.apply_application(
                        &mut effect_target,
                        effect_types,
                        definitions,
                        &application,
                        source,
                        duration_scale,
                        now,
                    );
                }
            }
            Intent::SpawnProjectile(spawn) => {
                events.push(SimEvent::ProjectileSpawned(spawn));
            }
        }
    }
}

fn resolve(index: &HashMap<EntityId, Entity>, id: EntityId) -> Option<Entity> {
    let entity = index.get(&id).copied();
    if entity.is_none() {
        debug!(entity = %id, "intent target no longer exists");
    }
    entity
}
