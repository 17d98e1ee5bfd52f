//! Stat model: base and current stat blocks, modifier layers, and damage
//! mitigation.
//!
//! Current stats are always derived: `recompute` copies the base block and
//! folds every live modifier layer over it in insertion order. Health is the
//! one value carried across a recompute, clamped into the new maximum.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};
use tracing::debug;

use crate::constants::*;
use crate::enums::UpgradeModifier;

/// Named stat. Parsed from the camelCase keys used in definition records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, EnumIter, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum StatKey {
    MaxHp,
    CurrentHp,
    MaxSpeed,
    Defense,
    AttackCooldownModifier,
    DamageModifier,
    ProjectileSpeedModifier,
    ProjectileSizeModifier,
    AreaOfEffectModifier,
    EffectDurationModifier,
    MeleeDamage,
    AttackCooldown,
    ProjectileDamage,
    ProjectileSpeed,
    XpValue,
    XpGainModifier,
    PickupRadiusModifier,
    Luck,
}

/// A full set of stat values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatBlock {
    pub max_hp: f64,
    pub current_hp: f64,
    pub max_speed: f64,
    pub defense: f64,
    pub attack_cooldown_modifier: f64,
    pub damage_modifier: f64,
    pub projectile_speed_modifier: f64,
    pub projectile_size_modifier: f64,
    pub area_of_effect_modifier: f64,
    pub effect_duration_modifier: f64,
    pub melee_damage: f64,
    pub attack_cooldown: f64,
    pub projectile_damage: f64,
    pub projectile_speed: f64,
    pub xp_value: f64,
    pub xp_gain_modifier: f64,
    pub pickup_radius_modifier: f64,
    pub luck: f64,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            max_hp: DEFAULT_PLAYER_HP,
            current_hp: DEFAULT_PLAYER_HP,
            max_speed: DEFAULT_PLAYER_SPEED,
            defense: 0.0,
            attack_cooldown_modifier: 1.0,
            damage_modifier: 1.0,
            projectile_speed_modifier: 1.0,
            projectile_size_modifier: 1.0,
            area_of_effect_modifier: 1.0,
            effect_duration_modifier: 1.0,
            melee_damage: 0.0,
            attack_cooldown: 0.0,
            projectile_damage: 0.0,
            projectile_speed: 0.0,
            xp_value: 0.0,
            xp_gain_modifier: 1.0,
            pickup_radius_modifier: 1.0,
            luck: DEFAULT_PLAYER_LUCK,
        }
    }
}

impl StatBlock {
    pub fn get(&self, key: StatKey) -> f64 {
        match key {
            StatKey::MaxHp => self.max_hp,
            StatKey::CurrentHp => self.current_hp,
            StatKey::MaxSpeed => self.max_speed,
            StatKey::Defense => self.defense,
            StatKey::AttackCooldownModifier => self.attack_cooldown_modifier,
            StatKey::DamageModifier => self.damage_modifier,
            StatKey::ProjectileSpeedModifier => self.projectile_speed_modifier,
            StatKey::ProjectileSizeModifier => self.projectile_size_modifier,
            StatKey::AreaOfEffectModifier => self.area_of_effect_modifier,
            StatKey::EffectDurationModifier => self.effect_duration_modifier,
            StatKey::MeleeDamage => self.melee_damage,
            StatKey::AttackCooldown => self.attack_cooldown,
            StatKey::ProjectileDamage => self.projectile_damage,
            StatKey::ProjectileSpeed => self.projectile_speed,
            StatKey::XpValue => self.xp_value,
            StatKey::XpGainModifier => self.xp_gain_modifier,
            StatKey::PickupRadiusModifier => self.pickup_radius_modifier,
            StatKey::Luck => self.luck,
        }
    }

    pub fn set(&mut self, key: StatKey, value: f64) {
        *self.slot_mut(key) = value;
    }

    fn slot_mut(&mut self, key: StatKey) -> &mut f64 {
        match key {
            StatKey::MaxHp => &mut self.max_hp,
            StatKey::CurrentHp => &mut self.current_hp,
            StatKey::MaxSpeed => &mut self.max_speed,
            StatKey::Defense => &mut self.defense,
            StatKey::AttackCooldownModifier => &mut self.attack_cooldown_modifier,
            StatKey::DamageModifier => &mut self.damage_modifier,
            StatKey::ProjectileSpeedModifier => &mut self.projectile_speed_modifier,
            StatKey::ProjectileSizeModifier => &mut self.projectile_size_modifier,
            StatKey::AreaOfEffectModifier => &mut self.area_of_effect_modifier,
            StatKey::EffectDurationModifier => &mut self.effect_duration_modifier,
            StatKey::MeleeDamage => &mut self.melee_damage,
            StatKey::AttackCooldown => &mut self.attack_cooldown,
            StatKey::ProjectileDamage => &mut self.projectile_damage,
            StatKey::ProjectileSpeed => &mut self.projectile_speed,
            StatKey::XpValue => &mut self.xp_value,
            StatKey::XpGainModifier => &mut self.xp_gain_modifier,
            StatKey::PickupRadiusModifier => &mut self.pickup_radius_modifier,
            StatKey::Luck => &mut self.luck,
        }
    }

    /// Overwrite every stat named in `overrides`. Unknown keys are skipped.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, f64>) -> Self {
        for (name, value) in overrides {
            match StatKey::from_str(name) {
                Ok(key) => self.set(key, *value),
                Err(_) => debug!(stat = %name, "ignoring unknown stat override"),
            }
        }
        self
    }
}

/// One stat adjustment. `add` applies before `multiply`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatModifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiply: Option<f64>,
}

impl StatModifier {
    pub fn multiply(factor: f64) -> Self {
        Self {
            add: None,
            multiply: Some(factor),
        }
    }

    pub fn add(delta: f64) -> Self {
        Self {
            add: Some(delta),
            multiply: None,
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let mut v = value;
        if let Some(delta) = self.add {
            v += delta;
        }
        if let Some(factor) = self.multiply {
            v *= factor;
        }
        v
    }
}

/// Modifier as written in a definition: a bare number is a multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModifierSpec {
    Factor(f64),
    Detailed(StatModifier),
}

impl From<ModifierSpec> for StatModifier {
    fn from(spec: ModifierSpec) -> Self {
        match spec {
            ModifierSpec::Factor(factor) => StatModifier::multiply(factor),
            ModifierSpec::Detailed(modifier) => modifier,
        }
    }
}

/// One modifier layer: the stat adjustments contributed by a single effect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatModifiers {
    entries: Vec<(StatKey, StatModifier)>,
}

impl StatModifiers {
    /// Resolve definition keys to stats. Unknown keys are ignored and
    /// `currentHp` is never modifiable.
    pub fn resolve(raw: &BTreeMap<String, ModifierSpec>) -> Self {
        let mut entries = Vec::with_capacity(raw.len());
        for (name, spec) in raw {
            match StatKey::from_str(name) {
                Ok(StatKey::CurrentHp) => {
                    debug!("ignoring modifier on currentHp");
                }
                Ok(key) => entries.push((key, StatModifier::from(*spec))),
                Err(_) => debug!(stat = %name, "ignoring modifier on unknown stat"),
            }
        }
        Self { entries }
    }

    pub fn push(&mut self, key: StatKey, modifier: StatModifier) {
        if key != StatKey::CurrentHp {
            self.entries.push((key, modifier));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(StatKey, StatModifier)> {
        self.entries.iter()
    }
}

/// Outcome of a damage application that changed health.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    /// Health actually removed.
    pub applied: f64,
    /// Health left afterwards.
    pub remaining: f64,
}

impl DamageOutcome {
    pub fn is_lethal(&self) -> bool {
        self.remaining <= 0.0
    }
}

/// Damage left after `defense`, floored at 1 and at a tenth of the raw hit.
pub fn mitigated_damage(amount: f64, defense: f64) -> f64 {
    let floor = (amount / DAMAGE_FLOOR_DIVISOR).ceil().max(MIN_DAMAGE);
    (amount - defense).max(floor)
}

/// Stat component: the authored base block and the derived current block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub base: StatBlock,
    pub current: StatBlock,
}

impl Stats {
    pub fn new(base: StatBlock) -> Self {
        let mut current = base.clone();
        current.max_hp = base.max_hp.max(0.0);
        current.current_hp = base.current_hp.min(current.max_hp).max(0.0);
        Self { base, current }
    }

    pub fn health(&self) -> f64 {
        self.current.current_hp
    }

    pub fn max_health(&self) -> f64 {
        self.current.max_hp
    }

    pub fn is_depleted(&self) -> bool {
        self.current.current_hp <= 0.0
    }

    /// Rebuild current stats from base plus `layers`, in order.
    ///
    /// Within a layer, additive deltas apply before multipliers. Health is
    /// preserved as `min(previous, new max)`.
    pub fn recompute<'a, I>(&mut self, layers: I)
    where
        I: IntoIterator<Item = &'a StatModifiers>,
    {
        let previous_hp = self.current.current_hp;
        let mut next = self.base.clone();
        for layer in layers {
            for (key, modifier) in layer.iter() {
                let slot = next.slot_mut(*key);
                *slot = modifier.apply(*slot);
            }
        }
        next.max_hp = next.max_hp.max(0.0);
        next.current_hp = previous_hp.min(next.max_hp).max(0.0);
        self.current = next;
    }

    /// Subtract mitigated damage. Non-positive amounts change nothing.
    pub fn take_damage(&mut self, amount: f64) -> Option<DamageOutcome> {
        if amount <= 0.0 || !amount.is_finite() {
            return None;
        }
        let mitigated = mitigated_damage(amount, self.current.defense);
        let applied = mitigated.min(self.current.current_hp);
        self.current.current_hp = (self.current.current_hp - applied).max(0.0);
        Some(DamageOutcome {
            applied,
            remaining: self.current.current_hp,
        })
    }

    /// Restore health up to the current maximum. Returns the amount healed.
    pub fn heal(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        let before = self.current.current_hp;
        self.current.current_hp = (before + amount).min(self.current.max_hp);
        self.current.current_hp - before
    }

    /// Permanently change a base stat. Returns `true` when max health rose,
    /// in which case the caller refills health after recomputing.
    pub fn upgrade_base(&mut self, key: StatKey, modifier: UpgradeModifier, value: f64) -> bool {
        let before = self.base.get(key);
        let after = modifier.combine(before, value);
        self.base.set(key, after);
        key == StatKey::MaxHp && after > before
    }

    /// Set health to the current maximum.
    pub fn refill(&mut self) {
        self.current.current_hp = self.current.max_hp;
    }
}
