//! Behavior system: runs every enemy brain once per frame.
//!
//! Each brain targets the nearest live player. Attacks triggered by a state
//! become intents; state changes become events.

use hecs::World;
use rand_chacha::ChaCha8Rng;

use brawl_ai::agent::TargetSighting;
use brawl_ai::brain::{Brain, BrainInput};
use brawl_core::components::{Combatant, Vitality};
use brawl_core::config::SimConfig;
use brawl_core::enums::Faction;
use brawl_core::events::{Intent, SimEvent};
use brawl_core::stats::Stats;
use brawl_core::types::{Position, Velocity};

use crate::combat::{AttackContext, AttackLoadout, LoadoutPort};
use crate::effects::StatusEffects;

use super::{contacts, nearest};

#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    config: &SimConfig,
    now: f64,
    delta: f64,
    intents: &mut Vec<Intent>,
    events: &mut Vec<SimEvent>,
) {
    let players = contacts(world, Faction::Player);

    for (_entity, (combatant, vitality, position, velocity, stats, effects, loadout, brain)) in
        world.query_mut::<(
            &Combatant,
            &Vitality,
            &Position,
            &mut Velocity,
            &Stats,
            &StatusEffects,
            &mut AttackLoadout,
            &mut Brain,
        )>()
    {
        if !vitality.is_alive() {
            continue;
        }

        let target = nearest(&players, position, f64::INFINITY).map(|c| TargetSighting {
            id: c.id,
            position: c.position,
            active: true,
        });
        let flags = effects.flags();

        let transitions = {
            let mut port = LoadoutPort {
                loadout,
                ctx: AttackContext {
                    attacker: combatant.id,
                    faction: combatant.faction,
                    position: *position,
                    stats: &stats.current,
                    flags,
                    now,
                    min_cooldown_ms: config.min_attack_cooldown_ms,
                    hostiles: &players,
                    intents: &mut *intents,
                    events: &mut *events,
                },
            };
            brain.step(
                BrainInput {
                    position: *position,
                    velocity,
                    move_speed: stats.current.max_speed,
                    flags,
                    target,
                    combat: &mut port,
                    rng: &mut *rng,
                },
                now,
                delta,
            )
        };

        for transition in transitions {
            events.push(SimEvent::StateChanged {
                entity: combatant.id,
                from: transition.from,
                to: transition.to,
            });
        }
    }
}
