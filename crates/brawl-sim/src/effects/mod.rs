//! Status-effect engine: the live effects on one entity.
//!
//! Effects are kept in application order and are unique per definition id.
//! Any change to the set of effects rebuilds the carrier's current stats
//! from its base stats and every remaining modifier layer.

pub mod kinds;
pub mod registry;

use tracing::{debug, warn};

use brawl_core::components::Vitality;
use brawl_core::definitions::{DefinitionProvider, EffectApplication, StatusEffectDefinition};
use brawl_core::events::SimEvent;
use brawl_core::flags::BehaviorFlags;
use brawl_core::state::EffectView;
use brawl_core::stats::{DamageOutcome, StatModifiers, Stats};
use brawl_core::types::{EntityId, Velocity};

use crate::combat::damage::apply_damage;

use self::kinds::EffectBehavior;
use self::registry::EffectTypeRegistry;

/// Mutable view of the entity an effect acts on.
pub struct EffectTarget<'a> {
    pub id: EntityId,
    pub stats: &'a mut Stats,
    pub velocity: &'a mut Velocity,
    pub vitality: &'a mut Vitality,
    pub events: &'a mut Vec<SimEvent>,
}

impl EffectTarget<'_> {
    pub fn take_damage(&mut self, amount: f64, source: Option<EntityId>) -> Option<DamageOutcome> {
        apply_damage(self.id, self.stats, self.vitality, amount, source, self.events)
    }
}

/// Per-application overrides of a template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectOverrides {
    /// Replaces the template duration, ms.
    pub duration_ms: Option<f64>,
    pub potency: Option<f64>,
    /// Multiplies the resolved duration.
    pub duration_scale: f64,
}

impl Default for EffectOverrides {
    fn default() -> Self {
        Self {
            duration_ms: None,
            potency: None,
            duration_scale: 1.0,
        }
    }
}

impl EffectOverrides {
    pub fn from_application(application: &EffectApplication, duration_scale: f64) -> Self {
        Self {
            duration_ms: application.duration,
            potency: application.potency,
            duration_scale,
        }
    }
}

/// Result of an apply call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new instance was created.
    Added,
    /// An existing instance gained a stack; carries the new count.
    Stacked(u32),
    /// An existing instance at its stack limit had its duration refreshed.
    Refreshed,
    /// Nothing happened.
    Rejected,
}

/// One live effect.
#[derive(Debug, Clone)]
pub struct StatusEffectInstance {
    pub id: String,
    pub type_tag: String,
    pub behavior: EffectBehavior,
    pub modifiers: StatModifiers,
    pub flags: BehaviorFlags,
    pub source: Option<EntityId>,
    pub applied_at: f64,
    /// `None` lasts until removed.
    pub duration_ms: Option<f64>,
    pub tick_interval_ms: Option<f64>,
    pub last_tick: f64,
    pub stacks: u32,
    pub max_stacks: u32,
}

impl StatusEffectInstance {
    pub fn is_expired(&self, now: f64) -> bool {
        self.duration_ms
            .is_some_and(|duration| now - self.applied_at >= duration)
    }

    pub fn remaining_ms(&self, now: f64) -> Option<f64> {
        self.duration_ms
            .map(|duration| (self.applied_at + duration - now).max(0.0))
    }
}

/// ECS component: all live effects on an entity.
#[derive(Debug, Clone, Default)]
pub struct StatusEffects {
    entries: Vec<StatusEffectInstance>,
}

impl StatusEffects {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, id: &str) -> Option<&StatusEffectInstance> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffectInstance> {
        self.entries.iter()
    }

    /// Union of every live effect's flags.
    pub fn flags(&self) -> BehaviorFlags {
        self.entries
            .iter()
            .fold(BehaviorFlags::empty(), |acc, e| acc | e.flags)
    }

    pub fn has_flag(&self, flag: BehaviorFlags) -> bool {
        self.flags().contains(flag)
    }

    pub fn views(&self, now: f64) -> Vec<EffectView> {
        self.entries
            .iter()
            .map(|e| EffectView {
                id: e.id.clone(),
                stacks: e.stacks,
                remaining_ms: e.remaining_ms(now),
            })
            .collect()
    }

    /// Resolve `application` through `definitions` and apply it.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_application(
        &mut self,
        target: &mut EffectTarget<'_>,
        types: &EffectTypeRegistry,
        definitions: &dyn DefinitionProvider,
        application: &EffectApplication,
        source: Option<EntityId>,
        duration_scale: f64,
        now: f64,
    ) -> ApplyOutcome {
        let Some(template) = definitions.status_effect(&application.effect_id) else {
            warn!(effect = %application.effect_id, "unknown status effect");
            return ApplyOutcome::Rejected;
        };
        let overrides = EffectOverrides::from_application(application, duration_scale);
        self.apply(target, types, template, overrides, source, now)
    }

    /// Apply a template to the carrier.
    ///
    /// Re-applying an effect that is already present refreshes its duration
    /// and adds a stack while below the stack limit. An explicit potency on
    /// the new application replaces the old one.
    pub fn apply(
        &mut self,
        target: &mut EffectTarget<'_>,
        types: &EffectTypeRegistry,
        template: &StatusEffectDefinition,
        overrides: EffectOverrides,
        source: Option<EntityId>,
        now: f64,
    ) -> ApplyOutcome {
        if !target.vitality.active {
            debug!(entity = %target.id, effect = %template.id, "effect on inactive entity ignored");
            return ApplyOutcome::Rejected;
        }

        let raw_duration = overrides.duration_ms.unwrap_or(template.duration);
        let duration_ms = (raw_duration >= 0.0).then(|| raw_duration * overrides.duration_scale);

        if let Some(existing) = self.entries.iter_mut().find(|e| e.id == template.id) {
            existing.applied_at = now;
            existing.duration_ms = duration_ms;
            existing.source = source.or(existing.source);
            if overrides.potency.is_some() {
                if let Some(behavior) = types.construct(template, overrides.potency) {
                    existing.behavior = behavior;
                }
            }
            let outcome = if existing.stacks < existing.max_stacks {
                existing.stacks += 1;
                ApplyOutcome::Stacked(existing.stacks)
            } else {
                ApplyOutcome::Refreshed
            };
            target.events.push(SimEvent::EffectApplied {
                entity: target.id,
                effect_id: existing.id.clone(),
                stacks: existing.stacks,
            });
            return outcome;
        }

        let Some(behavior) = types.construct(template, overrides.potency) else {
            return ApplyOutcome::Rejected;
        };

        let mut flags = BehaviorFlags::empty();
        for (name, enabled) in &template.behavioral_flags {
            match BehaviorFlags::from_definition_key(name) {
                Some(flag) if *enabled => flags |= flag,
                Some(_) => {}
                None => debug!(flag = %name, "ignoring unknown behavioral flag"),
            }
        }
        if behavior == EffectBehavior::Stun {
            flags |= BehaviorFlags::STUNNED;
        }

        let max_stacks = if template.can_stack {
            template.max_stacks.unwrap_or(1).max(1)
        } else {
            1
        };

        let instance = StatusEffectInstance {
            id: template.id.clone(),
            type_tag: template.type_tag.clone(),
            behavior,
            modifiers: StatModifiers::resolve(&template.stat_modifiers),
            flags,
            source,
            applied_at: now,
            duration_ms,
            tick_interval_ms: template.tick_rate.filter(|rate| *rate > 0.0),
            last_tick: now,
            stacks: 1,
            max_stacks,
        };
        instance.behavior.on_apply(target);
        target.events.push(SimEvent::EffectApplied {
            entity: target.id,
            effect_id: instance.id.clone(),
            stacks: 1,
        });
        self.entries.push(instance);
        self.refresh_stats(target);
        ApplyOutcome::Added
    }

    /// Advance every effect by one frame: run update hooks, fire periodic
    /// ticks that are due, then drop expired effects. Returns how many
    /// effects were removed.
    pub fn tick(&mut self, target: &mut EffectTarget<'_>, now: f64, delta: f64) -> usize {
        for effect in &mut self.entries {
            if effect.is_expired(now) {
                continue;
            }
            effect.behavior.on_update(target, delta);
            if let Some(interval) = effect.tick_interval_ms {
                if now >= effect.last_tick + interval {
                    effect.last_tick = now;
                    effect.behavior.on_tick(target, effect.stacks, effect.source);
                }
            }
        }

        let (expired, live): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.is_expired(now));
        self.entries = live;
        self.finish_removal(target, expired)
    }

    /// Remove one effect by id. Returns whether it was present.
    pub fn remove(&mut self, target: &mut EffectTarget<'_>, id: &str) -> bool {
        self.clear_matching(target, |e| e.id == id) > 0
    }

    /// Remove every effect matching `predicate`. Returns how many went.
    pub fn clear_matching<P>(&mut self, target: &mut EffectTarget<'_>, predicate: P) -> usize
    where
        P: Fn(&StatusEffectInstance) -> bool,
    {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| predicate(e));
        self.entries = kept;
        self.finish_removal(target, removed)
    }

    fn finish_removal(
        &mut self,
        target: &mut EffectTarget<'_>,
        removed: Vec<StatusEffectInstance>,
    ) -> usize {
        if removed.is_empty() {
            return 0;
        }
        let count = removed.len();
        for effect in removed {
            effect.behavior.on_remove(target);
            target.events.push(SimEvent::EffectRemoved {
                entity: target.id,
                effect_id: effect.id,
            });
        }
        self.refresh_stats(target);
        count
    }

    /// Rebuild current stats from base and the live modifier layers.
    pub fn refresh_stats(&self, target: &mut EffectTarget<'_>) {
        target
            .stats
            .recompute(self.entries.iter().map(|e| &e.modifiers));
        target.events.push(SimEvent::StatsChanged {
            entity: target.id,
            health: target.stats.health(),
            max_health: target.stats.max_health(),
        });
    }
}
