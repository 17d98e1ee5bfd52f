//! Cooldown system: refreshes attack readiness against the clock.

use hecs::World;

use crate::combat::AttackLoadout;

pub fn run(world: &mut World, now: f64) {
    for (_entity, loadout) in world.query_mut::<&mut AttackLoadout>() {
        loadout.tick_cooldowns(now);
    }
}
