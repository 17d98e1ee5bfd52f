//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};

/// Which side an entity fights for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Player-controlled.
    Player,
    /// AI-controlled.
    #[default]
    Enemy,
}

impl Faction {
    /// The faction this one attacks.
    pub fn opponent(self) -> Faction {
        match self {
            Faction::Player => Faction::Enemy,
            Faction::Enemy => Faction::Player,
        }
    }
}

/// Declared attack shape. Selects how the combat resolver executes an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttackKind {
    /// Single-target strike with a point range check.
    Melee,
    /// One or more projectiles handed to the host for flight.
    Ranged,
    /// Heals or buffs an ally. Not resolved by this core.
    Support,
    /// Applies an effect to the attacker itself.
    BuffSelf,
    /// Projectile that leaves a damaging area where it lands.
    RangedAreaDenial,
    /// Area strike around the attacker, re-applied every time it fires.
    MeleeAreaContinuous,
}

impl AttackKind {
    /// Kinds resolved against targets around the attacker.
    pub fn is_melee_family(self) -> bool {
        matches!(self, AttackKind::Melee | AttackKind::MeleeAreaContinuous)
    }

    /// Kinds resolved by emitting projectiles.
    pub fn is_ranged_family(self) -> bool {
        matches!(self, AttackKind::Ranged | AttackKind::RangedAreaDenial)
    }

    /// Area variant fired when no plain attack of this kind is ready.
    pub fn area_variant(self) -> Option<AttackKind> {
        match self {
            AttackKind::Melee => Some(AttackKind::MeleeAreaContinuous),
            AttackKind::Ranged => Some(AttackKind::RangedAreaDenial),
            _ => None,
        }
    }

    /// Whether `other` is this kind or its area variant.
    pub fn covers(self, other: AttackKind) -> bool {
        self == other || self.area_variant() == Some(other)
    }
}

/// Area-of-effect footprint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AreaShape {
    #[default]
    Circle,
    Cone,
    Box,
}

/// AI behavior mode. Exactly one is active per AI entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BehaviorStateId {
    Idle,
    Chasing,
    AttackingMelee,
    AttackingRanged,
    Fleeing,
}

/// How an upgrade combines with the value it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpgradeModifier {
    FlatSet,
    FlatAdd,
    PercentageMultiply,
}

impl UpgradeModifier {
    pub fn combine(self, current: f64, value: f64) -> f64 {
        match self {
            UpgradeModifier::FlatSet => value,
            UpgradeModifier::FlatAdd => current + value,
            UpgradeModifier::PercentageMultiply => current * value,
        }
    }
}

/// Per-attack values an attack upgrade can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum AttackStat {
    Damage,
    AttackCooldown,
    Range,
    ProjectilesPerShot,
}
