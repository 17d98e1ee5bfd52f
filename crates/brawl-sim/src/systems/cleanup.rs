//! Cleanup system: removes dead entities from the world.

use std::collections::HashMap;

use hecs::{Entity, World};

use brawl_core::components::{Combatant, Vitality};
use brawl_core::events::SimEvent;
use brawl_core::types::EntityId;

/// Despawn every dead entity. Uses a pre-allocated buffer to avoid per-frame
/// allocation.
pub fn run(
    world: &mut World,
    index: &mut HashMap<EntityId, Entity>,
    despawn_buffer: &mut Vec<Entity>,
    events: &mut Vec<SimEvent>,
) {
    despawn_buffer.clear();

    for (entity, (combatant, vitality)) in world.query_mut::<(&Combatant, &Vitality)>() {
        if vitality.dead {
            despawn_buffer.push(entity);
            index.remove(&combatant.id);
            events.push(SimEvent::Despawned {
                entity: combatant.id,
            });
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
