//! Snapshot system: builds the host-facing views of the world.
//!
//! This system is read-only; it never modifies the world.

use hecs::{Entity, World};

use brawl_ai::brain::Brain;
use brawl_core::components::{Combatant, Vitality};
use brawl_core::events::SimEvent;
use brawl_core::state::{EntityView, FrameSnapshot};
use brawl_core::stats::Stats;
use brawl_core::types::{Position, SimTime, Velocity};

use crate::combat::AttackLoadout;
use crate::effects::StatusEffects;

pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    paused: bool,
    events: Vec<SimEvent>,
) -> FrameSnapshot {
    let mut entities: Vec<EntityView> = world
        .iter()
        .filter_map(|entity_ref| build_view(world, entity_ref.entity(), time.now_ms))
        .collect();
    entities.sort_by_key(|view| view.id);

    FrameSnapshot {
        time: *time,
        paused,
        entities,
        events,
    }
}

/// View of one combat entity, or `None` if `entity` is not one.
pub fn build_view(world: &World, entity: Entity, now: f64) -> Option<EntityView> {
    let mut query = world
        .query_one::<(
            &Combatant,
            &Vitality,
            &Position,
            &Velocity,
            &Stats,
            &StatusEffects,
            &AttackLoadout,
            Option<&Brain>,
        )>(entity)
        .ok()?;
    let (combatant, vitality, position, velocity, stats, effects, loadout, brain) = query.get()?;

    Some(EntityView {
        id: combatant.id,
        faction: combatant.faction,
        kind: combatant.kind.clone(),
        position: position.0,
        velocity: velocity.0,
        health: stats.health(),
        max_health: stats.max_health(),
        alive: vitality.is_alive(),
        behavior: brain.and_then(Brain::state),
        effects: effects.views(now),
        attacks: loadout.views(),
    })
}
