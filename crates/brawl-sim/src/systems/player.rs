//! Player system: turns move input into velocity and fires auto-attacks.

use hecs::World;

use brawl_core::components::{Combatant, PlayerControl, Vitality};
use brawl_core::config::SimConfig;
use brawl_core::enums::{AttackKind, Faction};
use brawl_core::events::{Intent, SimEvent};
use brawl_core::stats::Stats;
use brawl_core::types::{Position, Velocity};

use crate::combat::{AttackContext, AttackLoadout};
use crate::effects::StatusEffects;

use super::{contacts, nearest};

/// Velocity = normalized input * current move speed, unless immobilized.
pub fn steer(world: &mut World) {
    for (_entity, (vitality, control, stats, effects, velocity)) in world.query_mut::<(
        &Vitality,
        &PlayerControl,
        &Stats,
        &StatusEffects,
        &mut Velocity,
    )>() {
        if !vitality.is_alive() || !effects.flags().can_move() {
            velocity.stop();
            continue;
        }
        velocity.0 = control.move_input.normalize_or_zero() * stats.current.max_speed;
    }
}

/// Fire every ready attack at the nearest enemy in reach.
///
/// Self buffs fire whenever ready. Ranged attacks need an enemy within the
/// auto-target range; melee attacks need one within their own reach.
pub fn auto_attack(
    world: &mut World,
    config: &SimConfig,
    now: f64,
    intents: &mut Vec<Intent>,
    events: &mut Vec<SimEvent>,
) {
    let enemies = contacts(world, Faction::Enemy);

    for (_entity, (combatant, vitality, position, stats, effects, loadout, _control)) in world
        .query_mut::<(
            &Combatant,
            &Vitality,
            &Position,
            &Stats,
            &StatusEffects,
            &mut AttackLoadout,
            &PlayerControl,
        )>()
    {
        if !vitality.is_alive() {
            continue;
        }
        let flags = effects.flags();
        if !flags.can_attack() {
            continue;
        }
        let target = nearest(&enemies, position, config.player_auto_target_range);

        for kind in loadout.kinds() {
            let Some(instance) = loadout.first_ready(kind) else {
                continue;
            };
            let in_reach = match kind {
                AttackKind::BuffSelf => true,
                AttackKind::Support => false,
                AttackKind::Ranged | AttackKind::RangedAreaDenial => target.is_some(),
                AttackKind::Melee | AttackKind::MeleeAreaContinuous => target
                    .is_some_and(|t| t.position.distance_to(position) <= instance.reach(&stats.current)),
            };
            if !in_reach {
                continue;
            }

            let mut ctx = AttackContext {
                attacker: combatant.id,
                faction: combatant.faction,
                position: *position,
                stats: &stats.current,
                flags,
                now,
                min_cooldown_ms: config.min_attack_cooldown_ms,
                hostiles: &enemies,
                intents: &mut *intents,
                events: &mut *events,
            };
            loadout.attempt_attack(kind, target.map(|t| t.position), &mut ctx);
        }
    }
}
