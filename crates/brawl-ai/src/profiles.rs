//! Behavior profiles: the per-enemy tuning behavior states consult.

use brawl_core::constants::*;
use brawl_core::definitions::EnemyDefinition;

/// Ranges and timings for one AI entity.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorProfile {
    /// Distance at which a target is noticed, px.
    pub sight_range: f64,
    /// Distance at which melee attacks are attempted, px.
    pub melee_range: f64,
    /// Distance at which ranged attacks are attempted, px.
    pub ranged_range: Option<f64>,
    pub is_ranged: bool,
    /// A chaser drops the target only beyond `sight_range * chase_hysteresis`.
    pub chase_hysteresis: f64,
    pub idle_min_ms: f64,
    pub idle_max_ms: f64,
    pub flee_duration_ms: f64,
    pub flee_speed_multiplier: f64,
}

impl Default for BehaviorProfile {
    fn default() -> Self {
        Self {
            sight_range: FALLBACK_ENEMY_SIGHT,
            melee_range: FALLBACK_ENEMY_MELEE_RANGE,
            ranged_range: None,
            is_ranged: false,
            chase_hysteresis: CHASE_HYSTERESIS,
            idle_min_ms: IDLE_MIN_MS,
            idle_max_ms: IDLE_MAX_MS,
            flee_duration_ms: FLEE_DURATION_MS,
            flee_speed_multiplier: FLEE_SPEED_MULTIPLIER,
        }
    }
}

impl BehaviorProfile {
    pub fn from_definition(def: &EnemyDefinition, chase_hysteresis: f64) -> Self {
        Self {
            sight_range: def.sight_range,
            melee_range: def.melee_attack_range,
            ranged_range: def.ranged_attack_range,
            is_ranged: def.is_ranged,
            chase_hysteresis,
            ..Self::default()
        }
    }

    /// Distance beyond which a chaser gives up.
    pub fn lose_sight_range(&self) -> f64 {
        self.sight_range * self.chase_hysteresis
    }

    /// Ranged reach, only for entities flagged as ranged.
    pub fn ranged_reach(&self) -> Option<f64> {
        if self.is_ranged {
            self.ranged_range
        } else {
            None
        }
    }
}
