//! Simulation configuration.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

/// Tunables for one simulation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimConfig {
    /// Seed for the session RNG. Same seed and inputs give the same run.
    pub seed: u64,
    /// Frame step the harness drives the engine with, ms.
    pub frame_ms: f64,
    /// Attack instances kept per entity; extras in a loadout are dropped.
    pub max_attacks_per_entity: usize,
    /// Floor on effective attack cooldowns, ms.
    pub min_attack_cooldown_ms: f64,
    /// Factor on sight range before a chaser gives up.
    pub chase_hysteresis: f64,
    /// Search radius for player auto-attacks, px.
    pub player_auto_target_range: f64,
    /// Remove dead entities from the world during cleanup.
    pub despawn_dead: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            frame_ms: DEFAULT_FRAME_MS,
            max_attacks_per_entity: DEFAULT_MAX_ATTACKS_PER_ENTITY,
            min_attack_cooldown_ms: MIN_ATTACK_COOLDOWN_MS,
            chase_hysteresis: CHASE_HYSTERESIS,
            player_auto_target_range: PLAYER_AUTO_TARGET_RANGE,
            despawn_dead: true,
        }
    }
}

impl SimConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse a partial JSON config over the defaults and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.frame_ms > 0.0) {
            return Err(ConfigError::Invalid {
                field: "frameMs",
                reason: "must be positive",
            });
        }
        if self.max_attacks_per_entity == 0 {
            return Err(ConfigError::Invalid {
                field: "maxAttacksPerEntity",
                reason: "must be at least 1",
            });
        }
        if !(self.chase_hysteresis > 1.0) {
            return Err(ConfigError::Invalid {
                field: "chaseHysteresis",
                reason: "must be greater than 1",
            });
        }
        if self.min_attack_cooldown_ms < 0.0 {
            return Err(ConfigError::Invalid {
                field: "minAttackCooldownMs",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}
