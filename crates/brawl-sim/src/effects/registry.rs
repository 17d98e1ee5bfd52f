//! Effect-type registry: maps the `type` tag of a status-effect definition
//! to the constructor of its behavior.

use std::collections::HashMap;

use tracing::warn;

use brawl_core::definitions::StatusEffectDefinition;

use super::kinds::EffectBehavior;

pub const SLOW_EFFECT: &str = "SLOW_EFFECT";
pub const DAMAGE_OVER_TIME_EFFECT: &str = "DAMAGE_OVER_TIME_EFFECT";
pub const STUN_EFFECT: &str = "STUN_EFFECT";
pub const STAT_MODIFIER_EFFECT: &str = "STAT_MODIFIER_EFFECT";

/// Builds a behavior from its template and the application's potency.
pub type EffectConstructor = fn(&StatusEffectDefinition, Option<f64>) -> EffectBehavior;

pub struct EffectTypeRegistry {
    constructors: HashMap<String, EffectConstructor>,
}

impl Default for EffectTypeRegistry {
    fn default() -> Self {
        Self::with_builtin_types()
    }
}

impl EffectTypeRegistry {
    /// A registry that knows no types.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    pub fn with_builtin_types() -> Self {
        let mut registry = Self::empty();
        registry.register(SLOW_EFFECT, build_passive);
        registry.register(STAT_MODIFIER_EFFECT, build_passive);
        registry.register(DAMAGE_OVER_TIME_EFFECT, build_damage_over_time);
        registry.register(STUN_EFFECT, build_stun);
        registry
    }

    /// Register a constructor. A later registration for the same tag wins.
    pub fn register(&mut self, tag: impl Into<String>, constructor: EffectConstructor) {
        let tag = tag.into();
        if self.constructors.insert(tag.clone(), constructor).is_some() {
            warn!(%tag, "effect type constructor replaced");
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Build the behavior for `template`, or `None` for an unregistered tag.
    pub fn construct(
        &self,
        template: &StatusEffectDefinition,
        potency: Option<f64>,
    ) -> Option<EffectBehavior> {
        let Some(constructor) = self.constructors.get(&template.type_tag) else {
            warn!(
                effect = %template.id,
                tag = %template.type_tag,
                "no constructor registered for effect type"
            );
            return None;
        };
        Some(constructor(template, potency))
    }
}

fn build_passive(_template: &StatusEffectDefinition, _potency: Option<f64>) -> EffectBehavior {
    EffectBehavior::Passive
}

fn build_damage_over_time(
    template: &StatusEffectDefinition,
    potency: Option<f64>,
) -> EffectBehavior {
    let damage_per_tick = potency
        .or(template.potency)
        .or_else(|| template.custom_number("damagePerTick"))
        .unwrap_or(0.0);
    EffectBehavior::DamageOverTime { damage_per_tick }
}

fn build_stun(_template: &StatusEffectDefinition, _potency: Option<f64>) -> EffectBehavior {
    EffectBehavior::Stun
}
