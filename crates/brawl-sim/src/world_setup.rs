//! Entity spawning: builds component bundles from definitions.
//!
//! Unknown definitions never fail a spawn. They log a warning and fall back
//! to built-in stand-ins.

use std::sync::Arc;

use hecs::{Entity, World};
use tracing::{debug, warn};

use brawl_ai::brain::Brain;
use brawl_ai::profiles::BehaviorProfile;
use brawl_core::components::{Combatant, Knockback, PlayerControl, Vitality};
use brawl_core::config::SimConfig;
use brawl_core::constants::*;
use brawl_core::definitions::{AttackDefinition, DefinitionProvider, EnemyDefinition};
use brawl_core::enums::{AttackKind, Faction};
use brawl_core::stats::{StatBlock, Stats};
use brawl_core::types::{EntityId, Position, Velocity};

use crate::combat::AttackLoadout;
use crate::effects::StatusEffects;

pub fn spawn_enemy(
    world: &mut World,
    definitions: &dyn DefinitionProvider,
    config: &SimConfig,
    id: EntityId,
    enemy_type: &str,
    position: Position,
) -> Entity {
    let def = match definitions.enemy(enemy_type) {
        Some(def) => def.clone(),
        None => {
            warn!(%enemy_type, "unknown enemy type, using fallback stats");
            EnemyDefinition::fallback(enemy_type)
        }
    };

    let mut loadout =
        AttackLoadout::from_ids(&def.attacks, definitions, config.max_attacks_per_entity);
    if loadout.is_empty() {
        if let Some(strike) = def.innate_attack() {
            debug!(%enemy_type, attack = %strike.id, "using innate melee strike");
            loadout.add(Arc::new(strike));
        }
    }

    let brain = Brain::new(BehaviorProfile::from_definition(&def, config.chase_hysteresis));

    world.spawn((
        Combatant {
            id,
            faction: Faction::Enemy,
            kind: def.name.clone(),
        },
        Vitality::default(),
        position,
        Velocity::zero(),
        Knockback::default(),
        Stats::new(def.base_stats()),
        StatusEffects::default(),
        loadout,
        brain,
    ))
}

pub fn spawn_player(
    world: &mut World,
    definitions: &dyn DefinitionProvider,
    config: &SimConfig,
    id: EntityId,
    character_id: &str,
    position: Position,
) -> Entity {
    let (base, attacks) = match definitions.character(character_id) {
        Some(character) => (character.base_stats(), character.starting_attacks.clone()),
        None => {
            warn!(%character_id, "unknown character, using default player stats");
            (StatBlock::default(), Vec::new())
        }
    };

    let mut loadout = AttackLoadout::from_ids(&attacks, definitions, config.max_attacks_per_entity);
    if loadout.is_empty() {
        let fist = definitions
            .attack(FALLBACK_PLAYER_ATTACK)
            .unwrap_or_else(|| Arc::new(fist_punch()));
        debug!(%character_id, "no usable starting attack, equipping {FALLBACK_PLAYER_ATTACK}");
        loadout.add(fist);
    }

    world.spawn((
        Combatant {
            id,
            faction: Faction::Player,
            kind: character_id.to_string(),
        },
        Vitality::default(),
        position,
        Velocity::zero(),
        Knockback::default(),
        Stats::new(base),
        StatusEffects::default(),
        loadout,
        PlayerControl::default(),
    ))
}

/// Built-in bare-handed melee attack.
fn fist_punch() -> AttackDefinition {
    AttackDefinition {
        id: FALLBACK_PLAYER_ATTACK.to_string(),
        name: "Fist Punch".to_string(),
        kind: AttackKind::Melee,
        damage: 5.0,
        heal_amount: 0.0,
        attack_cooldown: 500.0,
        range: DEFAULT_MELEE_RANGE,
        projectile_type: None,
        projectiles_per_shot: None,
        spread_angle: None,
        projectile_speed: None,
        knockback_force: None,
        area_of_effect: None,
        duration: None,
        tick_rate: None,
        status_effect_on_hit: None,
        status_effect_on_self: None,
    }
}
