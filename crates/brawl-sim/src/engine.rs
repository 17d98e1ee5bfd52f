//! Simulation engine: the core of the combat simulation.
//!
//! `SimulationEngine` owns the hecs ECS world, processes host commands,
//! runs all systems once per frame, and produces `FrameSnapshot`s.
//! Completely headless, so runs are reproducible from a seed and a command
//! log.

use std::collections::{HashMap, VecDeque};
use std::str::FromStr;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use brawl_ai::brain::Brain;
use brawl_core::commands::HostCommand;
use brawl_core::components::{Combatant, PlayerControl, Vitality};
use brawl_core::config::SimConfig;
use brawl_core::definitions::{DefinitionProvider, EffectApplication, UpgradeEffect};
use brawl_core::enums::{AttackKind, AttackStat, BehaviorStateId, Faction};
use brawl_core::events::{Intent, SimEvent};
use brawl_core::state::{EntityView, FrameSnapshot};
use brawl_core::stats::{StatKey, Stats};
use brawl_core::types::{EntityId, Position, SimTime, Velocity};

use crate::combat::damage::apply_damage;
use crate::combat::{AttackContext, AttackLoadout};
use crate::effects::registry::EffectTypeRegistry;
use crate::effects::{ApplyOutcome, EffectTarget, StatusEffects};
use crate::error::SimError;
use crate::systems;
use crate::world_setup;

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    config: SimConfig,
    definitions: Box<dyn DefinitionProvider + Send + Sync>,
    effect_types: EffectTypeRegistry,
    time: SimTime,
    paused: bool,
    rng: ChaCha8Rng,
    next_entity_id: u32,
    index: HashMap<EntityId, Entity>,
    command_queue: VecDeque<HostCommand>,
    despawn_buffer: Vec<Entity>,
    intents: Vec<Intent>,
    events: Vec<SimEvent>,
}

impl SimulationEngine {
    /// Create an engine over `definitions` with the built-in effect types.
    pub fn new<D>(config: SimConfig, definitions: D) -> Self
    where
        D: DefinitionProvider + Send + Sync + 'static,
    {
        Self {
            world: World::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            definitions: Box::new(definitions),
            effect_types: EffectTypeRegistry::with_builtin_types(),
            time: SimTime::default(),
            paused: false,
            next_entity_id: 1,
            index: HashMap::new(),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            intents: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Replace the effect-type registry.
    pub fn with_effect_types(mut self, effect_types: EffectTypeRegistry) -> Self {
        self.effect_types = effect_types;
        self
    }

    pub fn effect_types_mut(&mut self) -> &mut EffectTypeRegistry {
        &mut self.effect_types
    }

    /// Queue a host command for processing at the next frame boundary.
    pub fn queue_command(&mut self, command: HostCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = HostCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by `delta_ms` and return the resulting snapshot.
    pub fn frame(&mut self, delta_ms: f64) -> FrameSnapshot {
        self.process_commands();

        if !self.paused && delta_ms > 0.0 {
            self.run_systems(delta_ms);
            self.time.advance(delta_ms);
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, self.paused, events)
    }

    /// Snapshot of the current world without advancing it. Pending events
    /// stay queued for the next frame.
    pub fn snapshot(&self) -> FrameSnapshot {
        systems::snapshot::build_snapshot(&self.world, &self.time, self.paused, Vec::new())
    }

    pub fn view(&self, id: EntityId) -> Option<EntityView> {
        let entity = self.index.get(&id)?;
        systems::snapshot::build_view(&self.world, *entity, self.time.now_ms)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn definitions(&self) -> &dyn DefinitionProvider {
        self.definitions.as_ref()
    }

    /// Copy of an entity's base and current stats.
    pub fn stats(&self, id: EntityId) -> Option<Stats> {
        let entity = self.index.get(&id)?;
        self.world.get::<&Stats>(*entity).ok().map(|s| (*s).clone())
    }

    /// Number of entities still in the world.
    pub fn entity_count(&self) -> usize {
        self.index.len()
    }

    // --- Spawning ---

    pub fn spawn_enemy(&mut self, enemy_type: &str, position: Position) -> EntityId {
        let id = self.allocate_id();
        let entity = world_setup::spawn_enemy(
            &mut self.world,
            self.definitions.as_ref(),
            &self.config,
            id,
            enemy_type,
            position,
        );
        self.register(id, entity, Faction::Enemy);
        id
    }

    pub fn spawn_player(&mut self, character_id: &str, position: Position) -> EntityId {
        let id = self.allocate_id();
        let entity = world_setup::spawn_player(
            &mut self.world,
            self.definitions.as_ref(),
            &self.config,
            id,
            character_id,
            position,
        );
        self.register(id, entity, Faction::Player);
        id
    }

    /// Remove an entity immediately. Returns whether it existed.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.index.remove(&id) else {
            return false;
        };
        let _ = self.world.despawn(entity);
        self.events.push(SimEvent::Despawned { entity: id });
        true
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    fn register(&mut self, id: EntityId, entity: Entity, faction: Faction) {
        self.index.insert(id, entity);
        self.events.push(SimEvent::Spawned {
            entity: id,
            faction,
        });
    }

    // --- Direct operations ---

    fn resolve(&self, id: EntityId) -> Result<Entity, SimError> {
        self.index
            .get(&id)
            .copied()
            .ok_or(SimError::UnknownEntity(id))
    }

    fn resolve_active(&self, id: EntityId) -> Result<Entity, SimError> {
        let entity = self.resolve(id)?;
        let active = self
            .world
            .get::<&Vitality>(entity)
            .map(|v| v.active)
            .map_err(|_| SimError::MissingComponent {
                entity: id,
                component: "Vitality",
            })?;
        if !active {
            return Err(SimError::Inactive(id));
        }
        Ok(entity)
    }

    /// Deal damage now, outside the intent pipeline. Returns the health
    /// actually removed; zero when the hit was a no-op.
    pub fn apply_damage(
        &mut self,
        target: EntityId,
        amount: f64,
        source: Option<EntityId>,
    ) -> Result<f64, SimError> {
        let entity = self.resolve(target)?;
        let (stats, vitality) = self
            .world
            .query_one_mut::<(&mut Stats, &mut Vitality)>(entity)
            .map_err(|_| SimError::MissingComponent {
                entity: target,
                component: "Stats",
            })?;
        let applied = apply_damage(target, stats, vitality, amount, source, &mut self.events)
            .map_or(0.0, |outcome| outcome.applied);
        Ok(applied)
    }

    /// Apply a status effect now.
    pub fn apply_status_effect(
        &mut self,
        target: EntityId,
        application: &EffectApplication,
        source: Option<EntityId>,
    ) -> Result<ApplyOutcome, SimError> {
        let entity = self.resolve(target)?;
        if self
            .definitions
            .status_effect(&application.effect_id)
            .is_none()
        {
            return Err(SimError::UnknownEffect(application.effect_id.clone()));
        }
        let now = self.time.now_ms;
        let (stats, velocity, vitality, effects) = self
            .world
            .query_one_mut::<(&mut Stats, &mut Velocity, &mut Vitality, &mut StatusEffects)>(entity)
            .map_err(|_| SimError::MissingComponent {
                entity: target,
                component: "StatusEffects",
            })?;
        let mut effect_target = EffectTarget {
            id: target,
            stats,
            velocity,
            vitality,
            events: &mut self.events,
        };
        Ok(effects.apply_application(
            &mut effect_target,
            &self.effect_types,
            self.definitions.as_ref(),
            application,
            source,
            1.0,
            now,
        ))
    }

    /// Remove a status effect by id. Returns whether it was present.
    pub fn remove_status_effect(&mut self, target: EntityId, effect_id: &str) -> Result<bool, SimError> {
        let entity = self.resolve(target)?;
        let (stats, velocity, vitality, effects) = self
            .world
            .query_one_mut::<(&mut Stats, &mut Velocity, &mut Vitality, &mut StatusEffects)>(entity)
            .map_err(|_| SimError::MissingComponent {
                entity: target,
                component: "StatusEffects",
            })?;
        let mut effect_target = EffectTarget {
            id: target,
            stats,
            velocity,
            vitality,
            events: &mut self.events,
        };
        Ok(effects.remove(&mut effect_target, effect_id))
    }

    /// Permanently change a base stat, then rebuild current stats.
    ///
    /// Raising max health also refills health to the new maximum.
    pub fn apply_upgrade(&mut self, target: EntityId, upgrade: &UpgradeEffect) -> Result<(), SimError> {
        let key = StatKey::from_str(&upgrade.stat)
            .map_err(|_| SimError::UnknownStat(upgrade.stat.clone()))?;
        let entity = self.resolve_active(target)?;
        let (stats, velocity, vitality, effects) = self
            .world
            .query_one_mut::<(&mut Stats, &mut Velocity, &mut Vitality, &mut StatusEffects)>(entity)
            .map_err(|_| SimError::MissingComponent {
                entity: target,
                component: "Stats",
            })?;

        let max_hp_raised = stats.upgrade_base(key, upgrade.modifier, upgrade.value);
        let mut effect_target = EffectTarget {
            id: target,
            stats,
            velocity,
            vitality,
            events: &mut self.events,
        };
        if max_hp_raised {
            effect_target.stats.recompute(effects.iter().map(|e| &e.modifiers));
            effect_target.stats.refill();
        }
        effects.refresh_stats(&mut effect_target);
        info!(entity = %target, stat = %upgrade.stat, value = upgrade.value, "upgrade applied");
        Ok(())
    }

    /// Change one attack's damage, cooldown, range or projectile count.
    pub fn upgrade_attack(
        &mut self,
        target: EntityId,
        attack_id: &str,
        upgrade: &UpgradeEffect,
    ) -> Result<(), SimError> {
        let stat = AttackStat::from_str(&upgrade.stat)
            .map_err(|_| SimError::UnknownStat(upgrade.stat.clone()))?;
        let entity = self.resolve(target)?;
        let mut loadout = self
            .world
            .get::<&mut AttackLoadout>(entity)
            .map_err(|_| SimError::MissingComponent {
                entity: target,
                component: "AttackLoadout",
            })?;
        let instance = loadout
            .get_mut(attack_id)
            .ok_or_else(|| SimError::UnknownAttack(attack_id.to_string()))?;
        instance.apply_upgrade(stat, upgrade.modifier, upgrade.value);
        Ok(())
    }

    /// Give an entity another attack. Returns `false` when it already has it
    /// or its loadout is full.
    pub fn add_attack(&mut self, target: EntityId, attack_id: &str) -> Result<bool, SimError> {
        let def = self
            .definitions
            .attack(attack_id)
            .ok_or_else(|| SimError::UnknownAttack(attack_id.to_string()))?;
        let entity = self.resolve(target)?;
        let mut loadout = self
            .world
            .get::<&mut AttackLoadout>(entity)
            .map_err(|_| SimError::MissingComponent {
                entity: target,
                component: "AttackLoadout",
            })?;
        Ok(loadout.add(def))
    }

    /// Fire the first ready attack of `kind` on behalf of `attacker`.
    ///
    /// The resulting intents are delivered during the next frame.
    pub fn attempt_attack(
        &mut self,
        attacker: EntityId,
        kind: AttackKind,
        aim: Option<Position>,
    ) -> Result<bool, SimError> {
        let entity = self.resolve_active(attacker)?;
        let faction = self
            .world
            .get::<&Combatant>(entity)
            .map(|c| c.faction)
            .map_err(|_| SimError::MissingComponent {
                entity: attacker,
                component: "Combatant",
            })?;
        let hostiles = systems::contacts(&self.world, faction.opponent());
        let now = self.time.now_ms;

        let (position, stats, effects, loadout) = self
            .world
            .query_one_mut::<(&Position, &Stats, &StatusEffects, &mut AttackLoadout)>(entity)
            .map_err(|_| SimError::MissingComponent {
                entity: attacker,
                component: "AttackLoadout",
            })?;
        let mut ctx = AttackContext {
            attacker,
            faction,
            position: *position,
            stats: &stats.current,
            flags: effects.flags(),
            now,
            min_cooldown_ms: self.config.min_attack_cooldown_ms,
            hostiles: &hostiles,
            intents: &mut self.intents,
            events: &mut self.events,
        };
        Ok(loadout.attempt_attack(kind, aim, &mut ctx))
    }

    // --- Commands ---

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(err) = self.handle_command(command) {
                warn!(%err, "host command ignored");
            }
        }
    }

    /// Handle a single host command.
    fn handle_command(&mut self, command: HostCommand) -> Result<(), SimError> {
        match command {
            HostCommand::SetMoveInput { entity, direction } => {
                let target = self.resolve(entity)?;
                let mut control = self.world.get::<&mut PlayerControl>(target).map_err(|_| {
                    SimError::MissingComponent {
                        entity,
                        component: "PlayerControl",
                    }
                })?;
                control.move_input = direction;
            }
            HostCommand::SetPosition { entity, position } => {
                let target = self.resolve(entity)?;
                let mut current = self.world.get::<&mut Position>(target).map_err(|_| {
                    SimError::MissingComponent {
                        entity,
                        component: "Position",
                    }
                })?;
                current.0 = position;
            }
            HostCommand::ProjectileHit {
                target,
                damage,
                source,
                on_hit,
                effect_duration_scale,
            } => {
                self.resolve(target)?;
                self.intents.push(Intent::Damage {
                    target,
                    amount: damage,
                    source,
                });
                if let Some(application) = on_hit {
                    self.intents.push(Intent::ApplyEffect {
                        target,
                        application,
                        source,
                        duration_scale: effect_duration_scale,
                    });
                }
            }
            HostCommand::ApplyEffect {
                target,
                application,
                source,
            } => {
                self.resolve(target)?;
                self.intents.push(Intent::ApplyEffect {
                    target,
                    application,
                    source,
                    duration_scale: 1.0,
                });
            }
            HostCommand::Frighten { entity } => {
                let target = self.resolve_active(entity)?;
                let mut brain = self.world.get::<&mut Brain>(target).map_err(|_| {
                    SimError::MissingComponent {
                        entity,
                        component: "Brain",
                    }
                })?;
                brain.request(BehaviorStateId::Fleeing);
            }
            HostCommand::Despawn { entity } => {
                if !self.despawn(entity) {
                    return Err(SimError::UnknownEntity(entity));
                }
            }
            HostCommand::Pause => {
                self.paused = true;
            }
            HostCommand::Resume => {
                self.paused = false;
            }
        }
        Ok(())
    }

    /// Run all systems in order.
    fn run_systems(&mut self, delta_ms: f64) {
        let now = self.time.now_ms;

        // 1. Attack cooldowns
        systems::cooldowns::run(&mut self.world, now);
        // 2. Enemy behavior
        systems::behavior::run(
            &mut self.world,
            &mut self.rng,
            &self.config,
            now,
            delta_ms,
            &mut self.intents,
            &mut self.events,
        );
        // 3. Player steering and auto-attacks
        systems::player::steer(&mut self.world);
        systems::player::auto_attack(
            &mut self.world,
            &self.config,
            now,
            &mut self.intents,
            &mut self.events,
        );
        // 4. Intent delivery (damage, knockback, effects, projectiles)
        systems::intents::deliver(
            &mut self.world,
            &self.index,
            self.definitions.as_ref(),
            &self.effect_types,
            now,
            &mut self.intents,
            &mut self.events,
        );
        // 5. Status effects (hooks, periodic ticks, expiry)
        systems::effects::run(&mut self.world, now, delta_ms, &mut self.events);
        // 6. Movement integration
        systems::movement::run(&mut self.world, delta_ms);
        // 7. Cleanup
        if self.config.despawn_dead {
            systems::cleanup::run(
                &mut self.world,
                &mut self.index,
                &mut self.despawn_buffer,
                &mut self.events,
            );
        }
        debug!(frame = self.time.frame, now, "frame complete");
    }
}
