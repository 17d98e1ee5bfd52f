//! Single entry point for removing health.

use tracing::debug;

use brawl_core::components::Vitality;
use brawl_core::events::SimEvent;
use brawl_core::stats::{DamageOutcome, Stats};
use brawl_core::types::EntityId;

/// Apply mitigated damage to one entity and emit the resulting events.
///
/// Inactive targets and non-positive amounts are ignored. The first hit that
/// empties health kills the entity and emits `Died`; later hits cannot.
pub fn apply_damage(
    id: EntityId,
    stats: &mut Stats,
    vitality: &mut Vitality,
    amount: f64,
    source: Option<EntityId>,
    events: &mut Vec<SimEvent>,
) -> Option<DamageOutcome> {
    if !vitality.active {
        debug!(entity = %id, "damage on inactive entity ignored");
        return None;
    }
    let outcome = stats.take_damage(amount)?;
    events.push(SimEvent::DamageTaken {
        target: id,
        amount: outcome.applied,
        remaining: outcome.remaining,
        source,
    });
    if outcome.is_lethal() && !vitality.dead {
        vitality.kill();
        events.push(SimEvent::Died {
            entity: id,
            killer: source,
            xp_value: stats.current.xp_value,
        });
    }
    Some(outcome)
}
