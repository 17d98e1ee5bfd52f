//! Attack execution by attack kind. Produces intents, never mutates targets.

use tracing::debug;

use brawl_core::constants::*;
use brawl_core::enums::AttackKind;
use brawl_core::events::{Intent, ProjectileSpawn};
use brawl_core::types::Position;

use super::spread::fan;
use super::{AttackContext, AttackInstance, Contact};

/// Execute `instance` and return the number of targets struck or
/// projectiles spawned.
pub fn execute(instance: &AttackInstance, aim: Option<Position>, ctx: &mut AttackContext<'_>) -> usize {
    match instance.kind() {
        AttackKind::Melee => {
            let reach = instance.range();
            match nearest_within(ctx.hostiles, &ctx.position, reach) {
                Some(contact) => {
                    strike(instance, &contact, ctx);
                    1
                }
                None => 0,
            }
        }
        AttackKind::MeleeAreaContinuous => {
            let radius = instance.area_radius(ctx.stats.area_of_effect_modifier);
            let struck: Vec<Contact> = ctx
                .hostiles
                .iter()
                .filter(|c| c.position.distance_to(&ctx.position) <= radius)
                .copied()
                .collect();
            for contact in &struck {
                strike(instance, contact, ctx);
            }
            struck.len()
        }
        AttackKind::Ranged | AttackKind::RangedAreaDenial => {
            let Some(aim) = aim else {
                debug!(attacker = %ctx.attacker, attack = %instance.id(), "ranged attack without aim point");
                return 0;
            };
            launch(instance, aim, ctx)
        }
        AttackKind::BuffSelf => {
            let Some(application) = instance.definition.status_effect_on_self.clone() else {
                debug!(attack = %instance.id(), "self buff without an effect");
                return 0;
            };
            ctx.intents.push(Intent::ApplyEffect {
                target: ctx.attacker,
                application,
                source: Some(ctx.attacker),
                duration_scale: ctx.stats.effect_duration_modifier,
            });
            1
        }
        AttackKind::Support => {
            debug!(attack = %instance.id(), "support attacks are not resolved by the simulation");
            0
        }
    }
}

fn nearest_within(hostiles: &[Contact], from: &Position, reach: f64) -> Option<Contact> {
    hostiles
        .iter()
        .map(|c| (c.position.distance_to(from), c))
        .filter(|(d, _)| *d <= reach)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| *c)
}

/// Damage, knockback and on-hit effect for one struck contact.
fn strike(instance: &AttackInstance, contact: &Contact, ctx: &mut AttackContext<'_>) {
    let damage = instance.damage() * ctx.stats.damage_modifier;
    if damage > 0.0 {
        ctx.intents.push(Intent::Damage {
            target: contact.id,
            amount: damage,
            source: Some(ctx.attacker),
        });
    }
    if let Some(force) = instance.definition.knockback_force.filter(|f| *f > 0.0) {
        ctx.intents.push(Intent::Knockback {
            target: contact.id,
            direction: ctx.position.direction_to(&contact.position),
            force,
        });
    }
    if let Some(application) = instance.definition.status_effect_on_hit.clone() {
        ctx.intents.push(Intent::ApplyEffect {
            target: contact.id,
            application,
            source: Some(ctx.attacker),
            duration_scale: ctx.stats.effect_duration_modifier,
        });
    }
}

fn launch(instance: &AttackInstance, aim: Position, ctx: &mut AttackContext<'_>) -> usize {
    let def = &instance.definition;
    let speed =
        def.projectile_speed.unwrap_or(DEFAULT_PROJECTILE_SPEED) * ctx.stats.projectile_speed_modifier;
    if speed <= 0.0 {
        debug!(attack = %instance.id(), "projectile speed is not positive");
        return 0;
    }
    let lifespan_ms = instance.range() / speed * 1000.0;
    let area_radius = (instance.kind() == AttackKind::RangedAreaDenial)
        .then(|| instance.area_radius(ctx.stats.area_of_effect_modifier));
    let projectile_type = def
        .projectile_type
        .clone()
        .unwrap_or_else(|| DEFAULT_PROJECTILE_TYPE.to_string());

    let headings = fan(
        ctx.position.angle_to(&aim),
        instance.projectiles_per_shot(),
        def.spread_angle.unwrap_or(0.0),
    );
    for direction in &headings {
        ctx.intents.push(Intent::SpawnProjectile(ProjectileSpawn {
            shooter: ctx.attacker,
            faction: ctx.faction,
            attack_id: def.id.clone(),
            projectile_type: projectile_type.clone(),
            origin: ctx.position.0 + *direction * PROJECTILE_ORIGIN_OFFSET,
            direction: *direction,
            speed,
            damage: instance.damage() * ctx.stats.damage_modifier,
            lifespan_ms,
            scale: ctx.stats.projectile_size_modifier,
            knockback_force: def.knockback_force.unwrap_or(0.0),
            area_radius,
            area_duration_ms: area_radius.and(def.duration),
            on_hit: def.status_effect_on_hit.clone(),
            effect_duration_scale: ctx.stats.effect_duration_modifier,
        }));
    }
    headings.len()
}
