//! Combat resolver: attack instances, loadouts and cooldown gating.
//!
//! An attack fires only when its instance is ready. Firing resolves the
//! attack into intents and starts a cooldown of
//! `max(base * attackCooldownModifier, floor)`.

pub mod damage;
pub mod resolve;
pub mod spread;

use std::sync::Arc;

use tracing::{debug, warn};

use brawl_ai::agent::CombatPort;
use brawl_core::definitions::{AttackDefinition, DefinitionProvider};
use brawl_core::enums::{AttackKind, AttackStat, Faction, UpgradeModifier};
use brawl_core::events::{Intent, SimEvent};
use brawl_core::flags::BehaviorFlags;
use brawl_core::state::AttackView;
use brawl_core::stats::StatBlock;
use brawl_core::types::{EntityId, Position};

/// A potential target as seen by an attacker this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: EntityId,
    pub position: Position,
}

/// Per-instance values changed by upgrades.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttackOverrides {
    pub damage: Option<f64>,
    pub cooldown_ms: Option<f64>,
    pub range: Option<f64>,
    pub projectiles_per_shot: Option<u32>,
}

/// One attack owned by an entity.
#[derive(Debug, Clone)]
pub struct AttackInstance {
    pub definition: Arc<AttackDefinition>,
    pub overrides: AttackOverrides,
    /// Set by the cooldown system once `ready_at` has passed.
    pub ready: bool,
    pub ready_at: f64,
    pub last_fired: Option<f64>,
    pub cooldown_remaining_ms: f64,
}

impl AttackInstance {
    pub fn new(definition: Arc<AttackDefinition>) -> Self {
        Self {
            definition,
            overrides: AttackOverrides::default(),
            ready: true,
            ready_at: 0.0,
            last_fired: None,
            cooldown_remaining_ms: 0.0,
        }
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn kind(&self) -> AttackKind {
        self.definition.kind
    }

    pub fn damage(&self) -> f64 {
        self.overrides.damage.unwrap_or(self.definition.damage)
    }

    pub fn base_cooldown(&self) -> f64 {
        self.overrides
            .cooldown_ms
            .unwrap_or(self.definition.attack_cooldown)
    }

    pub fn range(&self) -> f64 {
        self.overrides
            .range
            .unwrap_or_else(|| self.definition.reach())
    }

    pub fn projectiles_per_shot(&self) -> u32 {
        self.overrides
            .projectiles_per_shot
            .or(self.definition.projectiles_per_shot)
            .unwrap_or(1)
            .max(1)
    }

    /// Radius of area attacks: declared radius (or range) times `aoe_modifier`.
    pub fn area_radius(&self, aoe_modifier: f64) -> f64 {
        let radius = self
            .definition
            .area_of_effect
            .as_ref()
            .and_then(|area| area.radius)
            .unwrap_or_else(|| self.range());
        radius * aoe_modifier
    }

    /// Distance at which this attack can land on a target.
    pub fn reach(&self, stats: &StatBlock) -> f64 {
        match self.kind() {
            AttackKind::MeleeAreaContinuous => self.area_radius(stats.area_of_effect_modifier),
            _ => self.range(),
        }
    }

    pub fn effective_cooldown(&self, stats: &StatBlock, floor_ms: f64) -> f64 {
        (self.base_cooldown() * stats.attack_cooldown_modifier).max(floor_ms)
    }

    fn start_cooldown(&mut self, now: f64, cooldown_ms: f64) {
        self.ready = false;
        self.ready_at = now + cooldown_ms;
        self.last_fired = Some(now);
        self.cooldown_remaining_ms = cooldown_ms;
    }

    /// Refresh readiness against the clock.
    pub fn tick_cooldown(&mut self, now: f64) {
        self.cooldown_remaining_ms = (self.ready_at - now).max(0.0);
        self.ready = now >= self.ready_at;
    }

    pub fn apply_upgrade(&mut self, stat: AttackStat, modifier: UpgradeModifier, value: f64) {
        match stat {
            AttackStat::Damage => {
                self.overrides.damage = Some(modifier.combine(self.damage(), value));
            }
            AttackStat::AttackCooldown => {
                self.overrides.cooldown_ms =
                    Some(modifier.combine(self.base_cooldown(), value).max(0.0));
            }
            AttackStat::Range => {
                self.overrides.range = Some(modifier.combine(self.range(), value).max(0.0));
            }
            AttackStat::ProjectilesPerShot => {
                let count = modifier.combine(f64::from(self.projectiles_per_shot()), value);
                self.overrides.projectiles_per_shot = Some(count.round().max(1.0) as u32);
            }
        }
    }

    pub fn view(&self) -> AttackView {
        AttackView {
            id: self.definition.id.clone(),
            kind: self.kind(),
            cooldown_remaining_ms: self.cooldown_remaining_ms,
        }
    }
}

/// Everything an attack needs to know about its user for one attempt.
pub struct AttackContext<'a> {
    pub attacker: EntityId,
    pub faction: Faction,
    pub position: Position,
    pub stats: &'a StatBlock,
    pub flags: BehaviorFlags,
    pub now: f64,
    pub min_cooldown_ms: f64,
    /// Live opponents this frame.
    pub hostiles: &'a [Contact],
    pub intents: &'a mut Vec<Intent>,
    pub events: &'a mut Vec<SimEvent>,
}

/// ECS component: an entity's attack instances in definition order.
#[derive(Debug, Clone)]
pub struct AttackLoadout {
    instances: Vec<AttackInstance>,
    capacity: usize,
}

impl AttackLoadout {
    pub fn new(capacity: usize) -> Self {
        Self {
            instances: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Resolve attack ids in order. Unknown ids are skipped; ids past the
    /// capacity are dropped.
    pub fn from_ids(ids: &[String], definitions: &dyn DefinitionProvider, capacity: usize) -> Self {
        let mut loadout = Self::new(capacity);
        for id in ids {
            match definitions.attack(id) {
                Some(def) => {
                    loadout.add(def);
                }
                None => warn!(attack = %id, "unknown attack in loadout"),
            }
        }
        loadout
    }

    /// Add an instance. Duplicates and additions past capacity are refused.
    pub fn add(&mut self, definition: Arc<AttackDefinition>) -> bool {
        if self.contains(&definition.id) {
            warn!(attack = %definition.id, "attack already in loadout");
            return false;
        }
        if self.instances.len() >= self.capacity {
            warn!(
                attack = %definition.id,
                capacity = self.capacity,
                "loadout full, attack dropped"
            );
            return false;
        }
        self.instances.push(AttackInstance::new(definition));
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.instances.iter().any(|a| a.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&AttackInstance> {
        self.instances.iter().find(|a| a.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut AttackInstance> {
        self.instances.iter_mut().find(|a| a.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttackInstance> {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Kind of each instance, in loadout order.
    pub fn kinds(&self) -> Vec<AttackKind> {
        self.instances.iter().map(AttackInstance::kind).collect()
    }

    /// First ready instance of `kind`.
    pub fn first_ready(&self, kind: AttackKind) -> Option<&AttackInstance> {
        self.instances.iter().find(|a| a.kind() == kind && a.ready)
    }

    pub fn tick_cooldowns(&mut self, now: f64) {
        for instance in &mut self.instances {
            instance.tick_cooldown(now);
        }
    }

    /// Fire the first ready instance of `kind`.
    ///
    /// Returns `false` when the user may not attack or no instance of that
    /// kind is ready.
    pub fn attempt_attack(
        &mut self,
        kind: AttackKind,
        aim: Option<Position>,
        ctx: &mut AttackContext<'_>,
    ) -> bool {
        if !ctx.flags.can_attack() {
            return false;
        }
        let Some(instance) = self
            .instances
            .iter_mut()
            .find(|a| a.kind() == kind && a.ready)
        else {
            return false;
        };

        let hits = resolve::execute(instance, aim, ctx);
        let cooldown = instance.effective_cooldown(ctx.stats, ctx.min_cooldown_ms);
        instance.start_cooldown(ctx.now, cooldown);
        debug!(
            attacker = %ctx.attacker,
            attack = %instance.id(),
            hits,
            cooldown,
            "attack fired"
        );
        ctx.events.push(SimEvent::AttackFired {
            entity: ctx.attacker,
            attack_id: instance.id().to_string(),
            kind: instance.kind(),
        });
        true
    }

    pub fn views(&self) -> Vec<AttackView> {
        self.instances.iter().map(AttackInstance::view).collect()
    }
}

/// Adapts a loadout to the AI's combat entry point.
pub struct LoadoutPort<'l, 'c> {
    pub loadout: &'l mut AttackLoadout,
    pub ctx: AttackContext<'c>,
}

impl CombatPort for LoadoutPort<'_, '_> {
    fn attempt_attack(&mut self, kind: AttackKind, aim: Option<Position>) -> bool {
        if self.loadout.attempt_attack(kind, aim, &mut self.ctx) {
            return true;
        }
        match kind.area_variant() {
            Some(variant) => self.loadout.attempt_attack(variant, aim, &mut self.ctx),
            None => false,
        }
    }

    fn holds(&self, kind: AttackKind) -> bool {
        self.loadout.iter().any(|a| kind.covers(a.kind()))
    }
}
