//! Movement system: integrates velocity and knockback into position.

use hecs::World;

use brawl_core::components::{Knockback, Vitality};
use brawl_core::constants::KNOCKBACK_DURATION_MS;
use brawl_core::types::{Position, Velocity};
use glam::DVec2;

use crate::effects::StatusEffects;

/// Advance positions by `delta_ms`. Rooted or stunned entities ignore their
/// own velocity but can still be knocked back. Knockback fades linearly.
pub fn run(world: &mut World, delta_ms: f64) {
    let dt = delta_ms / 1000.0;
    for (_entity, (vitality, position, velocity, knockback, effects)) in world.query_mut::<(
        &Vitality,
        &mut Position,
        &Velocity,
        &mut Knockback,
        &StatusEffects,
    )>() {
        if !vitality.active {
            continue;
        }

        let mut step = DVec2::ZERO;
        if effects.flags().can_move() {
            step += velocity.0;
        }
        if knockback.remaining_ms > 0.0 {
            step += knockback.impulse * (knockback.remaining_ms / KNOCKBACK_DURATION_MS);
            knockback.remaining_ms = (knockback.remaining_ms - delta_ms).max(0.0);
            if knockback.remaining_ms == 0.0 {
                knockback.impulse = DVec2::ZERO;
            }
        }
        position.0 += step * dt;
    }
}
