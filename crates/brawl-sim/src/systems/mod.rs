//! ECS systems that operate on the simulation world each frame.
//!
//! Systems are free functions over `&mut World` (or `&World` for read-only).
//! They do not own state; all state lives in components.

pub mod behavior;
pub mod cleanup;
pub mod cooldowns;
pub mod effects;
pub mod intents;
pub mod movement;
pub mod player;
pub mod snapshot;

use hecs::World;

use brawl_core::components::{Combatant, Vitality};
use brawl_core::enums::Faction;
use brawl_core::types::Position;

use crate::combat::Contact;

/// Live members of `faction`, ordered by id.
pub fn contacts(world: &World, faction: Faction) -> Vec<Contact> {
    let mut found: Vec<Contact> = world
        .query::<(&Combatant, &Vitality, &Position)>()
        .iter()
        .filter(|(_, (combatant, vitality, _))| combatant.faction == faction && vitality.is_alive())
        .map(|(_, (combatant, _, position))| Contact {
            id: combatant.id,
            position: *position,
        })
        .collect();
    found.sort_by_key(|c| c.id);
    found
}

/// Closest contact to `from` no farther than `max_range`. Ties go to the
/// lower id.
pub fn nearest(contacts: &[Contact], from: &Position, max_range: f64) -> Option<Contact> {
    let mut best: Option<(f64, Contact)> = None;
    for contact in contacts {
        let d = contact.position.distance_to(from);
        if d > max_range {
            continue;
        }
        if best.map_or(true, |(best_d, _)| d < best_d) {
            best = Some((d, *contact));
        }
    }
    best.map(|(_, c)| c)
}
