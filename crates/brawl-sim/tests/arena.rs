//! End-to-end frames through the public engine API.

use brawl_sim::core::commands::HostCommand;
use brawl_sim::core::config::SimConfig;
use brawl_sim::core::definitions::{DefinitionRegistry, EffectApplication, UpgradeEffect};
use brawl_sim::core::enums::{AttackKind, BehaviorStateId, UpgradeModifier};
use brawl_sim::core::events::SimEvent;
use brawl_sim::core::state::FrameSnapshot;
use brawl_sim::core::types::{EntityId, Position};
use brawl_sim::effects::ApplyOutcome;
use brawl_sim::{SimError, SimulationEngine};
use glam::DVec2;

const FIXTURE: &str = include_str!("fixtures/arena.json");
const FRAME_MS: f64 = 16.0;

fn engine() -> SimulationEngine {
    engine_with_seed(1)
}

fn engine_with_seed(seed: u64) -> SimulationEngine {
    let definitions = DefinitionRegistry::from_json(FIXTURE).unwrap();
    SimulationEngine::new(SimConfig::with_seed(seed), definitions)
}

/// Run `frames` frames and return every snapshot.
fn run(engine: &mut SimulationEngine, frames: usize) -> Vec<FrameSnapshot> {
    (0..frames).map(|_| engine.frame(FRAME_MS)).collect()
}

fn events(snapshots: &[FrameSnapshot]) -> impl Iterator<Item = &SimEvent> {
    snapshots.iter().flat_map(|s| s.events.iter())
}

fn health(engine: &SimulationEngine, id: EntityId) -> f64 {
    engine.view(id).unwrap().health
}

/// Frame indices at which `entity` fired `attack_id`.
fn fire_frames(snapshots: &[FrameSnapshot], entity: EntityId, attack_id: &str) -> Vec<usize> {
    snapshots
        .iter()
        .enumerate()
        .filter(|(_, s)| {
            s.events.iter().any(|e| {
                matches!(e, SimEvent::AttackFired { entity: who, attack_id: id, .. }
                    if *who == entity && id == attack_id)
            })
        })
        .map(|(i, _)| i)
        .collect()
}

// ---- Damage ----

#[test]
fn test_defense_reduces_damage() {
    let mut engine = engine();
    let knight = engine.spawn_player("KNIGHT", Position::new(0.0, 0.0));

    let applied = engine.apply_damage(knight, 10.0, None).unwrap();
    assert_eq!(applied, 5.0);
    assert_eq!(health(&engine, knight), 95.0);
}

#[test]
fn test_heavy_defense_still_takes_minimum_damage() {
    let mut engine = engine();
    let tank = engine.spawn_player("TANK", Position::new(0.0, 0.0));

    engine.apply_damage(tank, 10.0, None).unwrap();
    assert_eq!(health(&engine, tank), 99.0);
}

#[test]
fn test_enemy_swing_lands_through_frames() {
    let mut engine = engine();
    let knight = engine.spawn_player("KNIGHT", Position::new(0.0, 0.0));
    let grunt = engine.spawn_enemy("grunt", Position::new(50.0, 0.0));

    let snapshots = run(&mut engine, 10);

    let hits: Vec<f64> = events(&snapshots)
        .filter_map(|e| match e {
            SimEvent::DamageTaken {
                target,
                amount,
                source,
                ..
            } if *target == knight => {
                assert_eq!(*source, Some(grunt));
                Some(*amount)
            }
            _ => None,
        })
        .collect();
    assert_eq!(hits, vec![5.0]);
    assert_eq!(health(&engine, knight), 95.0);
    assert_eq!(health(&engine, grunt), 20.0);
    assert_eq!(
        engine.view(grunt).unwrap().behavior,
        Some(BehaviorStateId::AttackingMelee)
    );
}

#[test]
fn test_death_emitted_once_then_despawned() {
    let mut engine = engine();
    let knight = engine.spawn_player("KNIGHT", Position::new(0.0, 0.0));
    let grunt = engine.spawn_enemy("grunt", Position::new(500.0, 0.0));

    assert_eq!(engine.apply_damage(grunt, 100.0, Some(knight)).unwrap(), 30.0);
    assert_eq!(engine.apply_damage(grunt, 100.0, Some(knight)).unwrap(), 0.0);
    assert!(!engine.view(grunt).unwrap().alive);

    let snapshot = engine.frame(FRAME_MS);
    let deaths: Vec<&SimEvent> = snapshot
        .events
        .iter()
        .filter(|e| matches!(e, SimEvent::Died { .. }))
        .collect();
    assert_eq!(deaths.len(), 1);
    assert!(matches!(
        deaths[0],
        SimEvent::Died { entity, killer: Some(k), xp_value } if *entity == grunt && *k == knight && *xp_value == 5.0
    ));
    assert!(snapshot
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::Despawned { entity } if *entity == grunt)));
    assert!(engine.view(grunt).is_none());
    assert_eq!(engine.entity_count(), 1);
    assert_eq!(
        engine.apply_damage(grunt, 1.0, None),
        Err(SimError::UnknownEntity(grunt))
    );
}

#[test]
fn test_dead_entities_kept_when_despawn_disabled() {
    let definitions = DefinitionRegistry::from_json(FIXTURE).unwrap();
    let config = SimConfig {
        despawn_dead: false,
        ..SimConfig::default()
    };
    let mut engine = SimulationEngine::new(config, definitions);
    let grunt = engine.spawn_enemy("grunt", Position::new(0.0, 0.0));

    engine.apply_damage(grunt, 100.0, None).unwrap();
    run(&mut engine, 3);
    assert!(!engine.view(grunt).unwrap().alive);
}

// ---- Attacks and cooldowns ----

#[test]
fn test_cooldown_gates_auto_attacks() {
    let mut engine = engine();
    let knight = engine.spawn_player("KNIGHT", Position::new(0.0, 0.0));
    let dummy = engine.spawn_enemy("dummy", Position::new(40.0, 0.0));

    let snapshots = run(&mut engine, 130);

    // Systems of frame i run at i * 16 ms; SLASH recovers after 1000 ms.
    assert_eq!(fire_frames(&snapshots, knight, "SLASH"), vec![0, 63, 126]);
    assert_eq!(health(&engine, dummy), 970.0);
}

#[test]
fn test_cooldown_floor_applies() {
    let mut engine = engine();
    let jabber = engine.spawn_player("JABBER", Position::new(0.0, 0.0));
    engine.spawn_enemy("dummy", Position::new(40.0, 0.0));

    let snapshots = run(&mut engine, 6);

    let view = engine.view(jabber).unwrap();
    assert_eq!(snapshots[0].entity(jabber).unwrap().attacks[0].cooldown_remaining_ms, 50.0);
    assert_eq!(fire_frames(&snapshots, jabber, "QUICK_JAB"), vec![0, 4]);
    assert_eq!(view.attacks[0].id, "QUICK_JAB");
}

#[test]
fn test_volley_events_carry_projectile_data() {
    let mut engine = engine();
    let ranger = engine.spawn_player("RANGER", Position::new(0.0, 0.0));
    engine.spawn_enemy("dummy", Position::new(100.0, 0.0));

    let snapshot = engine.frame(FRAME_MS);
    let spawns: Vec<_> = snapshot
        .events
        .iter()
        .filter_map(|e| match e {
            SimEvent::ProjectileSpawned(spawn) => Some(spawn),
            _ => None,
        })
        .collect();

    assert_eq!(spawns.len(), 3);
    for spawn in &spawns {
        assert_eq!(spawn.shooter, ranger);
        assert_eq!(spawn.attack_id, "TRIPLE");
        assert!((spawn.lifespan_ms - 800.0).abs() < 1e-9);
    }
    let angles: Vec<f64> = spawns
        .iter()
        .map(|s| s.direction.y.atan2(s.direction.x).to_degrees())
        .collect();
    assert!((angles[0] + 15.0).abs() < 1e-9);
    assert!((angles[2] - 15.0).abs() < 1e-9);
}

#[test]
fn test_projectile_upgrade_widens_volley() {
    let mut engine = engine();
    let ranger = engine.spawn_player("RANGER", Position::new(0.0, 0.0));
    engine.spawn_enemy("dummy", Position::new(100.0, 0.0));

    engine
        .upgrade_attack(
            ranger,
            "TRIPLE",
            &UpgradeEffect::new("projectilesPerShot", UpgradeModifier::FlatSet, 5.0),
        )
        .unwrap();
    let snapshot = engine.frame(FRAME_MS);

    let volley = snapshot
        .events
        .iter()
        .filter(|e| matches!(e, SimEvent::ProjectileSpawned(_)))
        .count();
    assert_eq!(volley, 5);
    assert!(matches!(
        engine.upgrade_attack(ranger, "SLASH", &UpgradeEffect::new("damage", UpgradeModifier::FlatAdd, 1.0)),
        Err(SimError::UnknownAttack(_))
    ));
    assert!(matches!(
        engine.upgrade_attack(ranger, "TRIPLE", &UpgradeEffect::new("bogus", UpgradeModifier::FlatAdd, 1.0)),
        Err(SimError::UnknownStat(_))
    ));
}

#[test]
fn test_projectile_hit_command_damages_and_applies_effect() {
    let mut engine = engine();
    let ranger = engine.spawn_player("RANGER", Position::new(0.0, 0.0));
    let dummy = engine.spawn_enemy("dummy", Position::new(1000.0, 0.0));

    engine.queue_command(HostCommand::ProjectileHit {
        target: dummy,
        damage: 25.0,
        source: Some(ranger),
        on_hit: Some(EffectApplication::new("SLOW")),
        effect_duration_scale: 1.0,
    });
    engine.frame(FRAME_MS);

    let view = engine.view(dummy).unwrap();
    assert_eq!(view.health, 975.0);
    assert_eq!(view.effects[0].id, "SLOW");
}

#[test]
fn test_add_attack() {
    let mut engine = engine();
    let knight = engine.spawn_player("KNIGHT", Position::new(0.0, 0.0));

    assert_eq!(engine.add_attack(knight, "SLASH"), Ok(false));
    assert_eq!(engine.add_attack(knight, "BOLT"), Ok(true));
    assert!(matches!(
        engine.add_attack(knight, "NOPE"),
        Err(SimError::UnknownAttack(_))
    ));
    assert_eq!(engine.view(knight).unwrap().attacks.len(), 2);
}

#[test]
fn test_characterless_player_gets_fist_punch() {
    let mut engine = engine();
    let novice = engine.spawn_player("NOVICE", Position::new(0.0, 0.0));
    let stranger = engine.spawn_player("NOBODY", Position::new(0.0, 0.0));

    for id in [novice, stranger] {
        let view = engine.view(id).unwrap();
        assert_eq!(view.attacks.len(), 1);
        assert_eq!(view.attacks[0].id, "FIST_PUNCH");
        assert_eq!(view.max_health, 100.0);
    }
}

#[test]
fn test_unknown_enemy_uses_fallback() {
    let mut engine = engine();
    let mystery = engine.spawn_enemy("wraith", Position::new(0.0, 0.0));

    let view = engine.view(mystery).unwrap();
    assert_eq!(view.max_health, 10.0);
    assert_eq!(view.kind, "wraith");
    assert_eq!(view.attacks[0].id, "WRAITH_STRIKE");
}

// ---- Knockback ----

#[test]
fn test_knockback_pushes_target_away() {
    let mut engine = engine();
    let bruiser = engine.spawn_player("BRUISER", Position::new(0.0, 0.0));
    let dummy = engine.spawn_enemy("dummy", Position::new(40.0, 0.0));

    let snapshots = run(&mut engine, 20);

    assert!(events(&snapshots).any(|e| matches!(
        e,
        SimEvent::KnockedBack { entity, impulse } if *entity == dummy && *impulse == DVec2::new(400.0, 0.0)
    )));
    let position = engine.view(dummy).unwrap().position;
    assert!(position.x > 70.0 && position.x < 75.0, "x = {}", position.x);
    assert_eq!(position.y, 0.0);
    assert_eq!(fire_frames(&snapshots, bruiser, "SHOVE"), vec![0]);
}

// ---- Status effects ----

#[test]
fn test_slow_stacks_through_engine() {
    let mut engine = engine();
    let novice = engine.spawn_player("NOVICE", Position::new(0.0, 0.0));
    let slow = EffectApplication::new("SLOW");

    for _ in 0..5 {
        engine.apply_status_effect(novice, &slow, None).unwrap();
    }

    let view = engine.view(novice).unwrap();
    assert_eq!(view.effects.len(), 1);
    assert_eq!(view.effects[0].stacks, 3);
    let speed = engine.stats(novice).unwrap().current.max_speed;
    assert!((speed - 140.0).abs() < 1e-9);
}

#[test]
fn test_damage_over_time_through_frames() {
    let mut engine = engine();
    let dummy = engine.spawn_enemy("dummy", Position::new(0.0, 0.0));
    engine
        .apply_status_effect(dummy, &EffectApplication::new("BURN"), None)
        .unwrap();

    let snapshots = run(&mut engine, 150);

    assert_eq!(health(&engine, dummy), 988.0);
    assert!(events(&snapshots).any(|e| matches!(
        e,
        SimEvent::EffectRemoved { entity, effect_id } if *entity == dummy && effect_id == "BURN"
    )));
    assert!(engine.view(dummy).unwrap().effects.is_empty());
}

#[test]
fn test_on_hit_effect_uses_duration_modifier() {
    let mut engine = engine();
    engine.spawn_player("FROSTBITE", Position::new(0.0, 0.0));
    let dummy = engine.spawn_enemy("dummy", Position::new(40.0, 0.0));

    engine.frame(FRAME_MS);

    let view = engine.view(dummy).unwrap();
    assert_eq!(view.effects.len(), 1);
    assert_eq!(view.effects[0].id, "SLOW");
    assert_eq!(view.effects[0].remaining_ms, Some(3984.0));
}

#[test]
fn test_self_buff_applies_haste() {
    let mut engine = engine();
    let captain = engine.spawn_player("CAPTAIN", Position::new(0.0, 0.0));

    let snapshot = engine.frame(FRAME_MS);

    assert!(snapshot.events.iter().any(|e| matches!(
        e,
        SimEvent::EffectApplied { entity, effect_id, stacks: 1 } if *entity == captain && effect_id == "HASTE"
    )));
    let stats = engine.stats(captain).unwrap();
    assert_eq!(stats.current.max_speed, 250.0);
    assert_eq!(stats.current.attack_cooldown_modifier, 0.5);
    assert_eq!(stats.base.max_speed, 200.0);
}

#[test]
fn test_unknown_effects() {
    let mut engine = engine();
    let novice = engine.spawn_player("NOVICE", Position::new(0.0, 0.0));

    assert_eq!(
        engine.apply_status_effect(novice, &EffectApplication::new("WEIRD"), None),
        Ok(ApplyOutcome::Rejected)
    );
    assert!(matches!(
        engine.apply_status_effect(novice, &EffectApplication::new("NOPE"), None),
        Err(SimError::UnknownEffect(_))
    ));
    assert_eq!(engine.remove_status_effect(novice, "SLOW"), Ok(false));
}

#[test]
fn test_stunned_enemy_waits_then_chases() {
    let mut engine = engine();
    engine.spawn_player("NOVICE", Position::new(0.0, 0.0));
    let grunt = engine.spawn_enemy("grunt", Position::new(200.0, 0.0));
    engine
        .apply_status_effect(grunt, &EffectApplication::new("STUN"), None)
        .unwrap();

    run(&mut engine, 60);
    let view = engine.view(grunt).unwrap();
    assert_eq!(view.position.x, 200.0);
    assert_eq!(view.behavior, Some(BehaviorStateId::Idle));

    run(&mut engine, 20);
    let view = engine.view(grunt).unwrap();
    assert!(view.effects.is_empty());
    assert_eq!(view.behavior, Some(BehaviorStateId::Chasing));
    assert!(view.position.x < 200.0);
}

#[test]
fn test_rooted_player_cannot_move() {
    let mut engine = engine();
    let novice = engine.spawn_player("NOVICE", Position::new(0.0, 0.0));
    engine
        .apply_status_effect(novice, &EffectApplication::new("SNARE"), None)
        .unwrap();
    engine.queue_command(HostCommand::SetMoveInput {
        entity: novice,
        direction: DVec2::new(1.0, 0.0),
    });

    run(&mut engine, 5);
    assert_eq!(engine.view(novice).unwrap().position, DVec2::ZERO);

    engine.remove_status_effect(novice, "SNARE").unwrap();
    engine.frame(FRAME_MS);
    let view = engine.view(novice).unwrap();
    assert!((view.position.x - 3.2).abs() < 1e-9);
    assert_eq!(view.velocity, DVec2::new(200.0, 0.0));
}

// ---- Upgrades ----

#[test]
fn test_max_hp_upgrade_refills_health() {
    let mut engine = engine();
    let knight = engine.spawn_player("KNIGHT", Position::new(0.0, 0.0));
    engine.apply_damage(knight, 40.0, None).unwrap();
    assert_eq!(health(&engine, knight), 65.0);

    engine
        .apply_upgrade(knight, &UpgradeEffect::new("defense", UpgradeModifier::FlatAdd, 5.0))
        .unwrap();
    assert_eq!(health(&engine, knight), 65.0);

    engine
        .apply_upgrade(knight, &UpgradeEffect::new("maxHp", UpgradeModifier::FlatAdd, 20.0))
        .unwrap();
    let view = engine.view(knight).unwrap();
    assert_eq!(view.max_health, 120.0);
    assert_eq!(view.health, 120.0);
    assert_eq!(engine.stats(knight).unwrap().current.defense, 10.0);

    assert!(matches!(
        engine.apply_upgrade(knight, &UpgradeEffect::new("charisma", UpgradeModifier::FlatAdd, 1.0)),
        Err(SimError::UnknownStat(_))
    ));
}

// ---- AI ----

#[test]
fn test_frighten_makes_enemy_flee() {
    let mut engine = engine();
    engine.spawn_player("NOVICE", Position::new(0.0, 0.0));
    let grunt = engine.spawn_enemy("grunt", Position::new(100.0, 0.0));

    engine.frame(FRAME_MS);
    assert_eq!(engine.view(grunt).unwrap().behavior, Some(BehaviorStateId::Chasing));

    engine.queue_command(HostCommand::Frighten { entity: grunt });
    let snapshot = engine.frame(FRAME_MS);

    assert!(snapshot.events.iter().any(|e| matches!(
        e,
        SimEvent::StateChanged { entity, to: BehaviorStateId::Fleeing, .. } if *entity == grunt
    )));
    let view = engine.view(grunt).unwrap();
    assert_eq!(view.behavior, Some(BehaviorStateId::Fleeing));
    assert!((view.velocity.x - 96.0).abs() < 1e-9);
}

#[test]
fn test_archer_prefers_ranged_attack() {
    let mut engine = engine();
    let novice = engine.spawn_player("NOVICE", Position::new(0.0, 0.0));
    let archer = engine.spawn_enemy("archer", Position::new(200.0, 0.0));

    let snapshots = run(&mut engine, 5);

    assert_eq!(
        engine.view(archer).unwrap().behavior,
        Some(BehaviorStateId::AttackingRanged)
    );
    let bolt = events(&snapshots)
        .find_map(|e| match e {
            SimEvent::ProjectileSpawned(spawn) if spawn.shooter == archer => Some(spawn),
            _ => None,
        })
        .unwrap();
    assert!((bolt.direction - DVec2::new(-1.0, 0.0)).length() < 1e-9);
    assert_eq!(health(&engine, novice), 100.0);
}

#[test]
fn test_brute_swings_area_attack_in_melee_state() {
    let mut engine = engine();
    let novice = engine.spawn_player("NOVICE", Position::new(0.0, 0.0));
    let brute = engine.spawn_enemy("brute", Position::new(50.0, 0.0));

    let snapshots = run(&mut engine, 10);

    assert_eq!(
        engine.view(brute).unwrap().behavior,
        Some(BehaviorStateId::AttackingMelee)
    );
    assert_eq!(fire_frames(&snapshots, brute, "WHIRL").len(), 1);
    assert!(events(&snapshots).any(|e| matches!(e,
        SimEvent::AttackFired { entity, kind: AttackKind::MeleeAreaContinuous, .. } if *entity == brute)));
    assert!(events(&snapshots).any(|e| matches!(e,
        SimEvent::DamageTaken { target, source: Some(who), .. } if *target == novice && *who == brute)));
    assert!(health(&engine, novice) < 100.0);
}

#[test]
fn test_ranged_enemy_lobs_area_denial_shell() {
    let mut engine = engine();
    engine.spawn_player("NOVICE", Position::new(0.0, 0.0));
    let hexer = engine.spawn_enemy("hexer", Position::new(200.0, 0.0));

    let snapshots = run(&mut engine, 5);

    assert_eq!(
        engine.view(hexer).unwrap().behavior,
        Some(BehaviorStateId::AttackingRanged)
    );
    assert_eq!(fire_frames(&snapshots, hexer, "MORTAR").len(), 1);
    assert!(events(&snapshots).any(|e| matches!(e,
        SimEvent::ProjectileSpawned(spawn) if spawn.shooter == hexer)));
}

#[test]
fn test_ranged_enemy_without_ranged_attack_uses_innate_strike() {
    let mut engine = engine();
    let novice = engine.spawn_player("NOVICE", Position::new(0.0, 0.0));
    let stray = engine.spawn_enemy("stray", Position::new(30.0, 0.0));

    let snapshots = run(&mut engine, 10);

    assert_eq!(
        engine.view(stray).unwrap().behavior,
        Some(BehaviorStateId::AttackingMelee)
    );
    assert_eq!(fire_frames(&snapshots, stray, "STRAY_STRIKE").len(), 1);
    assert!(health(&engine, novice) < 100.0);
}

// ---- Frame control ----

#[test]
fn test_pause_freezes_time() {
    let mut engine = engine();
    let novice = engine.spawn_player("NOVICE", Position::new(0.0, 0.0));
    engine.queue_commands([
        HostCommand::SetMoveInput {
            entity: novice,
            direction: DVec2::new(0.0, 3.0),
        },
        HostCommand::Pause,
    ]);

    let snapshot = engine.frame(FRAME_MS);
    assert!(snapshot.paused);
    assert_eq!(snapshot.time.frame, 0);
    assert_eq!(engine.view(novice).unwrap().position, DVec2::ZERO);

    engine.queue_command(HostCommand::Resume);
    let snapshot = engine.frame(FRAME_MS);
    assert!(!snapshot.paused);
    assert_eq!(snapshot.time.frame, 1);
    assert!((engine.view(novice).unwrap().position.y - 3.2).abs() < 1e-9);
}

#[test]
fn test_commands_for_missing_entities_are_ignored() {
    let mut engine = engine();
    engine.queue_commands([
        HostCommand::Frighten { entity: EntityId(99) },
        HostCommand::Despawn { entity: EntityId(99) },
        HostCommand::SetPosition {
            entity: EntityId(99),
            position: DVec2::ONE,
        },
    ]);
    let snapshot = engine.frame(FRAME_MS);
    assert!(snapshot.events.is_empty());
    assert_eq!(snapshot.time.frame, 1);
}

#[test]
fn test_despawn_command() {
    let mut engine = engine();
    let grunt = engine.spawn_enemy("grunt", Position::new(0.0, 0.0));
    engine.queue_command(HostCommand::Despawn { entity: grunt });

    let snapshot = engine.frame(FRAME_MS);
    assert!(snapshot.entities.is_empty());
    assert!(snapshot
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::Despawned { entity } if *entity == grunt)));
}

// ---- Determinism ----

fn skirmish(seed: u64) -> Vec<String> {
    let mut engine = engine_with_seed(seed);
    engine.spawn_player("KNIGHT", Position::new(0.0, 0.0));
    engine.spawn_enemy("grunt", Position::new(250.0, 40.0));
    engine.spawn_enemy("archer", Position::new(-380.0, 0.0));
    engine.spawn_enemy("grunt", Position::new(0.0, 900.0));
    run(&mut engine, 300)
        .iter()
        .map(|s| serde_json::to_string(s).unwrap())
        .collect()
}

#[test]
fn test_determinism_same_seed() {
    assert_eq!(skirmish(12345), skirmish(12345));
}
