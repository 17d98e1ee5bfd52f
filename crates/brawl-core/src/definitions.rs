//! Immutable definition records and the lookup interface over them.
//!
//! Records are authored as JSON (camelCase keys) and loaded once into a
//! [`DefinitionRegistry`]. Runtime instances only ever read them.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::*;
use crate::enums::{AreaShape, AttackKind, UpgradeModifier};
use crate::error::DefinitionError;
use crate::stats::{ModifierSpec, StatBlock};

/// Attack record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttackKind,
    #[serde(default)]
    pub damage: f64,
    #[serde(default)]
    pub heal_amount: f64,
    /// Base cooldown, ms.
    pub attack_cooldown: f64,
    /// Reach, px. Zero means the default for the attack kind.
    #[serde(default)]
    pub range: f64,
    #[serde(default)]
    pub projectile_type: Option<String>,
    #[serde(default)]
    pub projectiles_per_shot: Option<u32>,
    /// Total fan angle in degrees.
    #[serde(default)]
    pub spread_angle: Option<f64>,
    #[serde(default)]
    pub projectile_speed: Option<f64>,
    #[serde(default)]
    pub knockback_force: Option<f64>,
    #[serde(default)]
    pub area_of_effect: Option<AreaOfEffect>,
    /// Lifetime of a lingering area, ms.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub tick_rate: Option<f64>,
    #[serde(default)]
    pub status_effect_on_hit: Option<EffectApplication>,
    #[serde(default)]
    pub status_effect_on_self: Option<EffectApplication>,
}

impl AttackDefinition {
    /// Declared range, or the kind's default when none is given.
    pub fn reach(&self) -> f64 {
        if self.range > 0.0 {
            return self.range;
        }
        if self.kind.is_ranged_family() {
            DEFAULT_RANGED_RANGE
        } else {
            DEFAULT_MELEE_RANGE
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaOfEffect {
    #[serde(default)]
    pub shape: AreaShape,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

/// Request to apply a status effect, optionally overriding its template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectApplication {
    #[serde(alias = "effectType")]
    pub effect_id: String,
    /// Overrides the template duration, ms.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Overrides the template potency.
    #[serde(default)]
    pub potency: Option<f64>,
}

impl EffectApplication {
    pub fn new(effect_id: impl Into<String>) -> Self {
        Self {
            effect_id: effect_id.into(),
            duration: None,
            potency: None,
        }
    }
}

/// Status-effect template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEffectDefinition {
    pub id: String,
    /// Effect-type tag. Selects the behavior constructor.
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub name: String,
    /// Lifetime, ms. Negative means it lasts until removed.
    pub duration: f64,
    /// Periodic hook interval, ms.
    #[serde(default)]
    pub tick_rate: Option<f64>,
    #[serde(default)]
    pub can_stack: bool,
    #[serde(default)]
    pub max_stacks: Option<u32>,
    #[serde(default)]
    pub stat_modifiers: BTreeMap<String, ModifierSpec>,
    #[serde(default)]
    pub behavioral_flags: BTreeMap<String, bool>,
    #[serde(default)]
    pub potency: Option<f64>,
    /// Free-form values consumed by specific effect types.
    #[serde(default)]
    pub custom_data: BTreeMap<String, serde_json::Value>,
}

impl StatusEffectDefinition {
    pub fn duration_ms(&self) -> Option<f64> {
        (self.duration >= 0.0).then_some(self.duration)
    }

    /// Numeric entry from `custom_data`.
    pub fn custom_number(&self, key: &str) -> Option<f64> {
        self.custom_data.get(key).and_then(serde_json::Value::as_f64)
    }
}

/// Enemy template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyDefinition {
    pub name: String,
    #[serde(default)]
    pub attacks: Vec<String>,
    pub sight_range: f64,
    #[serde(default)]
    pub is_ranged: bool,
    #[serde(default)]
    pub melee_attack_range: f64,
    #[serde(default)]
    pub ranged_attack_range: Option<f64>,
    #[serde(default)]
    pub max_hp: Option<f64>,
    #[serde(default)]
    pub max_speed: Option<f64>,
    #[serde(default)]
    pub defense: Option<f64>,
    #[serde(default)]
    pub xp_value: Option<f64>,
    /// Damage of the built-in strike used when no listed attack resolves.
    #[serde(default)]
    pub melee_damage: Option<f64>,
    #[serde(default)]
    pub attack_cooldown: Option<f64>,
}

impl EnemyDefinition {
    /// Stand-in for an unknown enemy type.
    pub fn fallback(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attacks: Vec::new(),
            sight_range: FALLBACK_ENEMY_SIGHT,
            is_ranged: false,
            melee_attack_range: FALLBACK_ENEMY_MELEE_RANGE,
            ranged_attack_range: None,
            max_hp: Some(FALLBACK_ENEMY_HP),
            max_speed: Some(FALLBACK_ENEMY_SPEED),
            defense: None,
            xp_value: None,
            melee_damage: Some(FALLBACK_ENEMY_DAMAGE),
            attack_cooldown: Some(FALLBACK_ENEMY_COOLDOWN_MS),
        }
    }

    pub fn base_stats(&self) -> StatBlock {
        let hp = self.max_hp.unwrap_or(FALLBACK_ENEMY_HP);
        StatBlock {
            max_hp: hp,
            current_hp: hp,
            max_speed: self.max_speed.unwrap_or(FALLBACK_ENEMY_SPEED),
            defense: self.defense.unwrap_or(0.0),
            melee_damage: self.melee_damage.unwrap_or(0.0),
            attack_cooldown: self.attack_cooldown.unwrap_or(0.0),
            xp_value: self.xp_value.unwrap_or(0.0),
            luck: 0.0,
            ..StatBlock::default()
        }
    }

    /// Built-in strike for enemies whose attack list resolves to nothing.
    pub fn innate_attack(&self) -> Option<AttackDefinition> {
        let damage = self.melee_damage.filter(|d| *d > 0.0)?;
        Some(AttackDefinition {
            id: format!("{}_STRIKE", self.name.to_uppercase()),
            name: format!("{} strike", self.name),
            kind: AttackKind::Melee,
            damage,
            heal_amount: 0.0,
            attack_cooldown: self.attack_cooldown.unwrap_or(FALLBACK_ENEMY_COOLDOWN_MS),
            range: self.melee_attack_range,
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
        })
    }
}

/// Playable character template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub starting_attacks: Vec<String>,
    /// Partial stat overrides on top of the player defaults.
    #[serde(default)]
    pub base_stats: BTreeMap<String, f64>,
}

impl CharacterDefinition {
    pub fn base_stats(&self) -> StatBlock {
        let block = StatBlock::default().with_overrides(&self.base_stats);
        StatBlock {
            current_hp: block.max_hp,
            ..block
        }
    }
}

/// Read-only lookup of definitions by id.
pub trait DefinitionProvider {
    fn attack(&self, id: &str) -> Option<Arc<AttackDefinition>>;
    fn enemy(&self, name: &str) -> Option<&EnemyDefinition>;
    fn status_effect(&self, id: &str) -> Option<&StatusEffectDefinition>;
    fn character(&self, id: &str) -> Option<&CharacterDefinition>;
}

/// On-disk layout of a definition file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionBundle {
    #[serde(default)]
    pub attacks: Vec<AttackDefinition>,
    #[serde(default)]
    pub enemies: Vec<EnemyDefinition>,
    #[serde(default)]
    pub status_effects: Vec<StatusEffectDefinition>,
    #[serde(default)]
    pub characters: Vec<CharacterDefinition>,
}

/// In-memory [`DefinitionProvider`].
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    attacks: HashMap<String, Arc<AttackDefinition>>,
    enemies: HashMap<String, EnemyDefinition>,
    status_effects: HashMap<String, StatusEffectDefinition>,
    characters: HashMap<String, CharacterDefinition>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let bundle: DefinitionBundle = serde_json::from_str(json)?;
        Self::from_bundle(bundle)
    }

    /// Validate and index a bundle. Later duplicates replace earlier ones.
    /// Invalid rows are logged and skipped; the rest still load.
    pub fn from_bundle(bundle: DefinitionBundle) -> Result<Self, DefinitionError> {
        let mut registry = Self::new();
        for def in bundle.attacks {
            skip_invalid(registry.insert_attack(def));
        }
        for def in bundle.enemies {
            skip_invalid(registry.insert_enemy(def));
        }
        for def in bundle.status_effects {
            skip_invalid(registry.insert_status_effect(def));
        }
        for def in bundle.characters {
            skip_invalid(registry.insert_character(def));
        }
        Ok(registry)
    }

    pub fn insert_attack(&mut self, def: AttackDefinition) -> Result<(), DefinitionError> {
        require_id("attack", &def.id)?;
        if !def.attack_cooldown.is_finite() || def.attack_cooldown < 0.0 {
            return Err(DefinitionError::Invalid {
                id: def.id,
                reason: "attackCooldown must be a non-negative number".into(),
            });
        }
        if self.attacks.contains_key(&def.id) {
            warn!(id = %def.id, "duplicate attack definition replaces earlier one");
        }
        self.attacks.insert(def.id.clone(), Arc::new(def));
        Ok(())
    }

    pub fn insert_enemy(&mut self, def: EnemyDefinition) -> Result<(), DefinitionError> {
        require_id("enemy", &def.name)?;
        if self.enemies.contains_key(&def.name) {
            warn!(name = %def.name, "duplicate enemy definition replaces earlier one");
        }
        self.enemies.insert(def.name.clone(), def);
        Ok(())
    }

    pub fn insert_status_effect(
        &mut self,
        def: StatusEffectDefinition,
    ) -> Result<(), DefinitionError> {
        require_id("status effect", &def.id)?;
        if let Some(rate) = def.tick_rate {
            if rate <= 0.0 {
                return Err(DefinitionError::Invalid {
                    id: def.id,
                    reason: "tickRate must be positive".into(),
                });
            }
        }
        if self.status_effects.contains_key(&def.id) {
            warn!(id = %def.id, "duplicate status effect definition replaces earlier one");
        }
        self.status_effects.insert(def.id.clone(), def);
        Ok(())
    }

    pub fn insert_character(&mut self, def: CharacterDefinition) -> Result<(), DefinitionError> {
        require_id("character", &def.id)?;
        if self.characters.contains_key(&def.id) {
            warn!(id = %def.id, "duplicate character definition replaces earlier one");
        }
        self.characters.insert(def.id.clone(), def);
        Ok(())
    }

    pub fn attack_count(&self) -> usize {
        self.attacks.len()
    }
}

fn skip_invalid(result: Result<(), DefinitionError>) {
    if let Err(err) = result {
        warn!(%err, "skipping definition");
    }
}

fn require_id(kind: &'static str, id: &str) -> Result<(), DefinitionError> {
    if id.trim().is_empty() {
        return Err(DefinitionError::EmptyId { kind });
    }
    Ok(())
}

impl DefinitionProvider for DefinitionRegistry {
    fn attack(&self, id: &str) -> Option<Arc<AttackDefinition>> {
        self.attacks.get(id).cloned()
    }

    fn enemy(&self, name: &str) -> Option<&EnemyDefinition> {
        self.enemies.get(name)
    }

    fn status_effect(&self, id: &str) -> Option<&StatusEffectDefinition> {
        self.status_effects.get(id)
    }

    fn character(&self, id: &str) -> Option<&CharacterDefinition> {
        self.characters.get(id)
    }
}

/// Permanent change to a stat or to one attack's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeEffect {
    /// Stat key (`maxHp`, `damageModifier`, ...) or attack value
    /// (`damage`, `attackCooldown`, `range`, `projectilesPerShot`).
    pub stat: String,
    pub modifier: UpgradeModifier,
    pub value: f64,
}

impl UpgradeEffect {
    pub fn new(stat: impl Into<String>, modifier: UpgradeModifier, value: f64) -> Self {
        Self {
            stat: stat.into(),
            modifier,
            value,
        }
    }
}
