#[cfg(test)]
mod tests {
    use brawl_core::components::Vitality;
    use brawl_core::definitions::{DefinitionProvider, DefinitionRegistry, EffectApplication};
    use brawl_core::enums::{AttackKind, AttackStat, Faction, UpgradeModifier};
    use brawl_core::events::{Intent, SimEvent};
    use brawl_core::flags::BehaviorFlags;
    use brawl_core::stats::{StatBlock, Stats};
    use brawl_core::types::{EntityId, Position, Velocity};
    use glam::DVec2;

    use crate::combat::spread::fan;
    use crate::combat::{AttackContext, AttackInstance, AttackLoadout, Contact};
    use crate::effects::kinds::EffectBehavior;
    use crate::effects::registry::EffectTypeRegistry;
    use crate::effects::{ApplyOutcome, EffectOverrides, EffectTarget, StatusEffects};
    use crate::systems::nearest;

    const FIXTURE: &str = include_str!("../tests/fixtures/arena.json");

    fn definitions() -> DefinitionRegistry {
        DefinitionRegistry::from_json(FIXTURE).unwrap()
    }

    /// Owns the components an `EffectTarget` borrows.
    struct Carrier {
        id: EntityId,
        stats: Stats,
        velocity: Velocity,
        vitality: Vitality,
        events: Vec<SimEvent>,
    }

    impl Carrier {
        fn new(base: StatBlock) -> Self {
            Self {
                id: EntityId(7),
                stats: Stats::new(base),
                velocity: Velocity::new(30.0, 40.0),
                vitality: Vitality::default(),
                events: Vec::new(),
            }
        }

        fn target(&mut self) -> EffectTarget<'_> {
            EffectTarget {
                id: self.id,
                stats: &mut self.stats,
                velocity: &mut self.velocity,
                vitality: &mut self.vitality,
                events: &mut self.events,
            }
        }
    }

    fn apply(
        effects: &mut StatusEffects,
        carrier: &mut Carrier,
        defs: &DefinitionRegistry,
        id: &str,
        now: f64,
    ) -> ApplyOutcome {
        let types = EffectTypeRegistry::default();
        let template = defs.status_effect(id).unwrap();
        effects.apply(
            &mut carrier.target(),
            &types,
            template,
            EffectOverrides::default(),
            None,
            now,
        )
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ---- Status effects ----

    #[test]
    fn test_slow_stacks_cap_at_three() {
        let defs = definitions();
        let mut carrier = Carrier::new(StatBlock::default());
        let mut effects = StatusEffects::default();

        let outcomes: Vec<ApplyOutcome> = (0..5)
            .map(|i| apply(&mut effects, &mut carrier, &defs, "SLOW", f64::from(i) * 100.0))
            .collect();

        assert_eq!(
            outcomes,
            vec![
                ApplyOutcome::Added,
                ApplyOutcome::Stacked(2),
                ApplyOutcome::Stacked(3),
                ApplyOutcome::Refreshed,
                ApplyOutcome::Refreshed,
            ]
        );
        assert_eq!(effects.len(), 1);
        let slow = effects.get("SLOW").unwrap();
        assert_eq!(slow.stacks, 3);
        assert_eq!(slow.applied_at, 400.0);
        assert!(approx(carrier.stats.current.max_speed, 140.0));
    }

    #[test]
    fn test_removing_effect_restores_stats() {
        let defs = definitions();
        let mut carrier = Carrier::new(StatBlock::default());
        let mut effects = StatusEffects::default();

        apply(&mut effects, &mut carrier, &defs, "SLOW", 0.0);
        assert!(effects.remove(&mut carrier.target(), "SLOW"));
        assert!(!effects.remove(&mut carrier.target(), "SLOW"));

        assert!(effects.is_empty());
        assert_eq!(carrier.stats.current.max_speed, 200.0);
        assert!(carrier
            .events
            .iter()
            .any(|e| matches!(e, SimEvent::EffectRemoved { effect_id, .. } if effect_id == "SLOW")));
    }

    #[test]
    fn test_damage_over_time_ticks_then_expires() {
        let defs = definitions();
        let mut carrier = Carrier::new(StatBlock::default());
        let mut effects = StatusEffects::default();
        apply(&mut effects, &mut carrier, &defs, "BURN", 0.0);

        // First tick lands one interval after application.
        effects.tick(&mut carrier.target(), 250.0, 250.0);
        assert_eq!(carrier.stats.health(), 100.0);

        for now in [500.0, 1000.0, 1500.0] {
            effects.tick(&mut carrier.target(), now, 500.0);
        }
        assert_eq!(carrier.stats.health(), 88.0);

        let removed = effects.tick(&mut carrier.target(), 2000.0, 500.0);
        assert_eq!(removed, 1);
        assert!(effects.is_empty());
        assert_eq!(carrier.stats.health(), 88.0);
    }

    #[test]
    fn test_damage_over_time_scales_with_stacks() {
        let defs = definitions();
        let mut carrier = Carrier::new(StatBlock::default());
        let mut effects = StatusEffects::default();
        let types = EffectTypeRegistry::default();
        let mut burn = defs.status_effect("BURN").unwrap().clone();
        burn.can_stack = true;
        burn.max_stacks = Some(2);

        for _ in 0..2 {
            effects.apply(
                &mut carrier.target(),
                &types,
                &burn,
                EffectOverrides::default(),
                None,
                0.0,
            );
        }
        effects.tick(&mut carrier.target(), 500.0, 500.0);
        assert_eq!(carrier.stats.health(), 92.0);
    }

    #[test]
    fn test_potency_override_sets_tick_damage() {
        let defs = definitions();
        let mut carrier = Carrier::new(StatBlock::default());
        let mut effects = StatusEffects::default();
        let types = EffectTypeRegistry::default();
        let application = EffectApplication {
            effect_id: "BURN".into(),
            duration: None,
            potency: Some(10.0),
        };

        effects.apply_application(&mut carrier.target(), &types, &defs, &application, None, 1.0, 0.0);
        assert_eq!(
            effects.get("BURN").unwrap().behavior,
            EffectBehavior::DamageOverTime {
                damage_per_tick: 10.0
            }
        );
    }

    #[test]
    fn test_reapply_with_stronger_potency_updates_tick_damage() {
        let defs = definitions();
        let mut carrier = Carrier::new(StatBlock::default());
        let mut effects = StatusEffects::default();
        let types = EffectTypeRegistry::default();
        let burn = |potency| EffectApplication {
            effect_id: "BURN".into(),
            duration: None,
            potency,
        };

        effects.apply_application(&mut carrier.target(), &types, &defs, &burn(Some(3.0)), None, 1.0, 0.0);
        effects.apply_application(&mut carrier.target(), &types, &defs, &burn(Some(9.0)), None, 1.0, 100.0);
        assert_eq!(
            effects.get("BURN").unwrap().behavior,
            EffectBehavior::DamageOverTime { damage_per_tick: 9.0 }
        );

        // A refresh without a potency keeps the current strength.
        effects.apply_application(&mut carrier.target(), &types, &defs, &burn(None), None, 1.0, 200.0);
        assert_eq!(
            effects.get("BURN").unwrap().behavior,
            EffectBehavior::DamageOverTime { damage_per_tick: 9.0 }
        );
    }

    #[test]
    fn test_stun_zeroes_velocity_and_sets_flag() {
        let defs = definitions();
        let mut carrier = Carrier::new(StatBlock::default());
        let mut effects = StatusEffects::default();

        apply(&mut effects, &mut carrier, &defs, "STUN", 0.0);
        assert!(carrier.velocity.is_zero());
        assert!(effects.has_flag(BehaviorFlags::STUNNED));
        assert!(!effects.flags().can_attack());

        carrier.velocity = Velocity::new(10.0, 0.0);
        effects.tick(&mut carrier.target(), 100.0, 100.0);
        assert!(carrier.velocity.is_zero());

        effects.tick(&mut carrier.target(), 1000.0, 900.0);
        assert!(effects.is_empty());
        assert!(effects.flags().can_move());
    }

    #[test]
    fn test_infinite_effect_never_expires() {
        let defs = definitions();
        let mut carrier = Carrier::new(StatBlock::default());
        let mut effects = StatusEffects::default();

        apply(&mut effects, &mut carrier, &defs, "SNARE", 0.0);
        effects.tick(&mut carrier.target(), 1.0e9, 16.0);

        assert!(effects.has_flag(BehaviorFlags::ROOTED));
        assert!(!effects.flags().can_move());
        assert!(effects.flags().can_attack());
        assert_eq!(effects.views(1.0e9)[0].remaining_ms, None);
    }

    #[test]
    fn test_unregistered_effect_type_is_rejected() {
        let defs = definitions();
        let mut carrier = Carrier::new(StatBlock::default());
        let mut effects = StatusEffects::default();

        assert_eq!(
            apply(&mut effects, &mut carrier, &defs, "WEIRD", 0.0),
            ApplyOutcome::Rejected
        );

        let empty = EffectTypeRegistry::empty();
        let outcome = effects.apply(
            &mut carrier.target(),
            &empty,
            defs.status_effect("SLOW").unwrap(),
            EffectOverrides::default(),
            None,
            0.0,
        );
        assert_eq!(outcome, ApplyOutcome::Rejected);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_custom_effect_type_registration() {
        fn build_stun(_: &brawl_core::definitions::StatusEffectDefinition, _: Option<f64>) -> EffectBehavior {
            EffectBehavior::Stun
        }
        let defs = definitions();
        let mut carrier = Carrier::new(StatBlock::default());
        let mut effects = StatusEffects::default();
        let mut types = EffectTypeRegistry::default();
        types.register("MYSTERY_EFFECT", build_stun);

        let outcome = effects.apply(
            &mut carrier.target(),
            &types,
            defs.status_effect("WEIRD").unwrap(),
            EffectOverrides::default(),
            None,
            0.0,
        );
        assert_eq!(outcome, ApplyOutcome::Added);
        assert!(effects.has_flag(BehaviorFlags::STUNNED));
    }

    #[test]
    fn test_inactive_carrier_rejects_effects() {
        let defs = definitions();
        let mut carrier = Carrier::new(StatBlock::default());
        carrier.vitality.kill();
        let mut effects = StatusEffects::default();

        assert_eq!(
            apply(&mut effects, &mut carrier, &defs, "SLOW", 0.0),
            ApplyOutcome::Rejected
        );
    }

    #[test]
    fn test_duration_scale_and_override() {
        let defs = definitions();
        let mut carrier = Carrier::new(StatBlock::default());
        let mut effects = StatusEffects::default();
        let types = EffectTypeRegistry::default();
        let application = EffectApplication {
            effect_id: "SLOW".into(),
            duration: Some(2000.0),
            potency: None,
        };

        effects.apply_application(&mut carrier.target(), &types, &defs, &application, None, 2.0, 100.0);
        assert_eq!(effects.get("SLOW").unwrap().remaining_ms(100.0), Some(4000.0));
    }

    // ---- Attacks ----

    fn instance(defs: &DefinitionRegistry, id: &str) -> AttackInstance {
        AttackInstance::new(defs.attack(id).unwrap())
    }

    struct Volley {
        stats: StatBlock,
        hostiles: Vec<Contact>,
        intents: Vec<Intent>,
        events: Vec<SimEvent>,
    }

    impl Volley {
        fn new(hostiles: Vec<Contact>) -> Self {
            Self {
                stats: StatBlock::default(),
                hostiles,
                intents: Vec::new(),
                events: Vec::new(),
            }
        }

        fn ctx(&mut self, flags: BehaviorFlags, now: f64) -> AttackContext<'_> {
            AttackContext {
                attacker: EntityId(1),
                faction: Faction::Player,
                position: Position::new(0.0, 0.0),
                stats: &self.stats,
                flags,
                now,
                min_cooldown_ms: 50.0,
                hostiles: &self.hostiles,
                intents: &mut self.intents,
                events: &mut self.events,
            }
        }
    }

    fn contact(id: u32, x: f64, y: f64) -> Contact {
        Contact {
            id: EntityId(id),
            position: Position::new(x, y),
        }
    }

    #[test]
    fn test_fan_single_projectile_follows_aim() {
        let headings = fan(0.0, 1, 30.0);
        assert_eq!(headings, vec![DVec2::X]);
        assert_eq!(fan(1.0, 4, 0.0).len(), 1);
    }

    #[test]
    fn test_fan_spreads_evenly() {
        let headings = fan(0.0, 3, 30.0);
        assert_eq!(headings.len(), 3);
        let angles: Vec<f64> = headings
            .iter()
            .map(|d| d.y.atan2(d.x).to_degrees())
            .collect();
        assert!((angles[0] + 15.0).abs() < 1e-9);
        assert!(angles[1].abs() < 1e-9);
        assert!((angles[2] - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_effective_cooldown_respects_floor() {
        let defs = definitions();
        let stats = StatBlock::default();
        assert_eq!(instance(&defs, "QUICK_JAB").effective_cooldown(&stats, 50.0), 50.0);

        let hasted = StatBlock {
            attack_cooldown_modifier: 0.5,
            ..StatBlock::default()
        };
        assert_eq!(instance(&defs, "SLASH").effective_cooldown(&hasted, 50.0), 500.0);
    }

    #[test]
    fn test_attack_upgrades() {
        let defs = definitions();
        let mut triple = instance(&defs, "TRIPLE");
        triple.apply_upgrade(AttackStat::ProjectilesPerShot, UpgradeModifier::FlatAdd, 2.0);
        assert_eq!(triple.projectiles_per_shot(), 5);

        triple.apply_upgrade(AttackStat::Damage, UpgradeModifier::PercentageMultiply, 1.5);
        assert_eq!(triple.damage(), 9.0);

        triple.apply_upgrade(AttackStat::AttackCooldown, UpgradeModifier::FlatAdd, -2000.0);
        assert_eq!(triple.base_cooldown(), 0.0);

        triple.apply_upgrade(AttackStat::Range, UpgradeModifier::FlatSet, 300.0);
        assert_eq!(triple.range(), 300.0);
        assert_eq!(defs.attack("TRIPLE").unwrap().range, 240.0);
    }

    #[test]
    fn test_loadout_refuses_duplicates_and_overflow() {
        let defs = definitions();
        let mut loadout = AttackLoadout::new(2);
        assert!(loadout.add(defs.attack("SLASH").unwrap()));
        assert!(!loadout.add(defs.attack("SLASH").unwrap()));
        assert!(loadout.add(defs.attack("BOLT").unwrap()));
        assert!(!loadout.add(defs.attack("TRIPLE").unwrap()));
        assert_eq!(loadout.len(), 2);
        assert_eq!(loadout.kinds(), vec![AttackKind::Melee, AttackKind::Ranged]);
    }

    #[test]
    fn test_loadout_skips_unknown_ids() {
        let defs = definitions();
        let ids = vec!["SLASH".to_string(), "NOPE".to_string(), "BOLT".to_string()];
        let loadout = AttackLoadout::from_ids(&ids, &defs, 6);
        assert_eq!(loadout.len(), 2);
        assert!(loadout.contains("BOLT"));
    }

    #[test]
    fn test_melee_hits_nearest_hostile_in_range() {
        let defs = definitions();
        let mut loadout = AttackLoadout::new(6);
        loadout.add(defs.attack("SLASH").unwrap());
        let mut volley = Volley::new(vec![contact(2, 55.0, 0.0), contact(3, 20.0, 0.0)]);

        let fired = loadout.attempt_attack(AttackKind::Melee, None, &mut volley.ctx(BehaviorFlags::empty(), 0.0));

        assert!(fired);
        assert_eq!(volley.intents.len(), 1);
        assert!(matches!(
            volley.intents[0],
            Intent::Damage { target: EntityId(3), amount, source: Some(EntityId(1)) } if amount == 10.0
        ));
        assert!(matches!(volley.events[0], SimEvent::AttackFired { kind: AttackKind::Melee, .. }));
    }

    #[test]
    fn test_attack_gated_by_cooldown() {
        let defs = definitions();
        let mut loadout = AttackLoadout::new(6);
        loadout.add(defs.attack("SLASH").unwrap());
        let mut volley = Volley::new(vec![contact(2, 20.0, 0.0)]);

        assert!(loadout.attempt_attack(AttackKind::Melee, None, &mut volley.ctx(BehaviorFlags::empty(), 0.0)));
        assert!(!loadout.attempt_attack(AttackKind::Melee, None, &mut volley.ctx(BehaviorFlags::empty(), 10.0)));

        loadout.tick_cooldowns(999.0);
        assert!(loadout.first_ready(AttackKind::Melee).is_none());
        assert_eq!(loadout.get("SLASH").unwrap().cooldown_remaining_ms, 1.0);

        loadout.tick_cooldowns(1000.0);
        assert!(loadout.attempt_attack(AttackKind::Melee, None, &mut volley.ctx(BehaviorFlags::empty(), 1000.0)));
        assert_eq!(volley.intents.len(), 2);
    }

    #[test]
    fn test_missed_swing_still_spends_cooldown() {
        let defs = definitions();
        let mut loadout = AttackLoadout::new(6);
        loadout.add(defs.attack("SLASH").unwrap());
        let mut volley = Volley::new(vec![contact(2, 500.0, 0.0)]);

        assert!(loadout.attempt_attack(AttackKind::Melee, None, &mut volley.ctx(BehaviorFlags::empty(), 0.0)));
        assert!(volley.intents.is_empty());
        assert!(!loadout.get("SLASH").unwrap().ready);
    }

    #[test]
    fn test_stunned_or_disarmed_cannot_attack() {
        let defs = definitions();
        let mut loadout = AttackLoadout::new(6);
        loadout.add(defs.attack("SLASH").unwrap());
        let mut volley = Volley::new(vec![contact(2, 20.0, 0.0)]);

        for flags in [BehaviorFlags::STUNNED, BehaviorFlags::DISARMED] {
            assert!(!loadout.attempt_attack(AttackKind::Melee, None, &mut volley.ctx(flags, 0.0)));
        }
        assert!(loadout.get("SLASH").unwrap().ready);
        assert!(volley.events.is_empty());
    }

    #[test]
    fn test_ranged_volley_spawns_fanned_projectiles() {
        let defs = definitions();
        let mut loadout = AttackLoadout::new(6);
        loadout.add(defs.attack("TRIPLE").unwrap());
        let mut volley = Volley::new(Vec::new());

        let fired = loadout.attempt_attack(
            AttackKind::Ranged,
            Some(Position::new(100.0, 0.0)),
            &mut volley.ctx(BehaviorFlags::empty(), 0.0),
        );
        assert!(fired);

        let spawns: Vec<_> = volley
            .intents
            .iter()
            .filter_map(|i| match i {
                Intent::SpawnProjectile(spawn) => Some(spawn),
                _ => None,
            })
            .collect();
        assert_eq!(spawns.len(), 3);
        for spawn in &spawns {
            assert_eq!(spawn.projectile_type, "ARROW");
            assert_eq!(spawn.speed, 300.0);
            assert!(approx(spawn.lifespan_ms, 800.0));
            assert_eq!(spawn.damage, 6.0);
            assert_eq!(spawn.area_radius, None);
        }
        assert!(approx(spawns[1].origin.x, 26.0));
        assert!(approx(spawns[1].origin.y, 0.0));
        assert!(spawns[0].direction.y < 0.0 && spawns[2].direction.y > 0.0);
    }

    #[test]
    fn test_ranged_without_aim_spawns_nothing() {
        let defs = definitions();
        let mut loadout = AttackLoadout::new(6);
        loadout.add(defs.attack("BOLT").unwrap());
        let mut volley = Volley::new(Vec::new());

        assert!(loadout.attempt_attack(AttackKind::Ranged, None, &mut volley.ctx(BehaviorFlags::empty(), 0.0)));
        assert!(volley.intents.is_empty());
    }

    #[test]
    fn test_area_attack_hits_everything_in_radius() {
        let defs = definitions();
        let mut loadout = AttackLoadout::new(6);
        loadout.add(defs.attack("WHIRL").unwrap());
        let mut volley = Volley::new(vec![
            contact(2, 30.0, 0.0),
            contact(3, 0.0, -79.0),
            contact(4, 90.0, 0.0),
        ]);

        loadout.attempt_attack(
            AttackKind::MeleeAreaContinuous,
            None,
            &mut volley.ctx(BehaviorFlags::empty(), 0.0),
        );
        let targets: Vec<EntityId> = volley
            .intents
            .iter()
            .filter_map(|i| match i {
                Intent::Damage { target, .. } => Some(*target),
                _ => None,
            })
            .collect();
        assert_eq!(targets, vec![EntityId(2), EntityId(3)]);
    }

    #[test]
    fn test_knockback_and_on_hit_effect_intents() {
        let defs = definitions();
        let mut loadout = AttackLoadout::new(6);
        loadout.add(defs.attack("SHOVE").unwrap());
        loadout.add(defs.attack("FROST_TOUCH").unwrap());
        let mut volley = Volley::new(vec![contact(2, 0.0, 30.0)]);
        volley.stats.effect_duration_modifier = 1.5;

        loadout.attempt_attack(AttackKind::Melee, None, &mut volley.ctx(BehaviorFlags::empty(), 0.0));
        loadout.attempt_attack(AttackKind::Melee, None, &mut volley.ctx(BehaviorFlags::empty(), 0.0));

        assert!(volley.intents.iter().any(|i| matches!(
            i,
            Intent::Knockback { target: EntityId(2), direction, force } if *direction == DVec2::Y && *force == 400.0
        )));
        assert!(volley.intents.iter().any(|i| matches!(
            i,
            Intent::ApplyEffect { application, duration_scale, .. }
                if application.effect_id == "SLOW" && *duration_scale == 1.5
        )));
    }

    #[test]
    fn test_buff_self_targets_attacker() {
        let defs = definitions();
        let mut loadout = AttackLoadout::new(6);
        loadout.add(defs.attack("RALLY").unwrap());
        let mut volley = Volley::new(Vec::new());

        loadout.attempt_attack(AttackKind::BuffSelf, None, &mut volley.ctx(BehaviorFlags::empty(), 0.0));
        assert!(matches!(
            &volley.intents[0],
            Intent::ApplyEffect { target: EntityId(1), application, .. } if application.effect_id == "HASTE"
        ));
    }

    // ---- Targeting ----

    #[test]
    fn test_nearest_prefers_lower_id_on_tie() {
        let contacts = vec![contact(2, 10.0, 0.0), contact(5, -10.0, 0.0), contact(9, 3.0, 0.0)];
        let origin = Position::new(0.0, 0.0);

        assert_eq!(nearest(&contacts, &origin, 100.0).unwrap().id, EntityId(9));
        assert_eq!(nearest(&contacts[..2], &origin, 100.0).unwrap().id, EntityId(2));
        assert!(nearest(&contacts, &origin, 2.0).is_none());
    }
}
