//! Status-effect system: ticks and expires effects on every live entity.

use hecs::World;

use brawl_core::components::{Combatant, Vitality};
use brawl_core::events::SimEvent;
use brawl_core::stats::Stats;
use brawl_core::types::Velocity;

use crate::effects::{EffectTarget, StatusEffects};

pub fn run(world: &mut World, now: f64, delta: f64, events: &mut Vec<SimEvent>) {
    for (_entity, (combatant, stats, velocity, vitality, effects)) in world.query_mut::<(
        &Combatant,
        &mut Stats,
        &mut Velocity,
        &mut Vitality,
        &mut StatusEffects,
    )>() {
        if !vitality.active || effects.is_empty() {
            continue;
        }
        let mut target = EffectTarget {
            id: combatant.id,
            stats,
            velocity,
            vitality,
            events: &mut *events,
        };
        effects.tick(&mut target, now, delta);
    }
}
