//! Gameplay constants. Every tunable literal in the simulation lives here.

// --- Timing ---

/// Default frame step when the host does not supply one (60 Hz).
pub const DEFAULT_FRAME_MS: f64 = 1000.0 / 60.0;

/// Lower bound on any attack's effective cooldown, ms.
pub const MIN_ATTACK_COOLDOWN_MS: f64 = 50.0;

// --- AI behavior ---

/// Idle dwell window, ms. A fresh duration is drawn uniformly from it.
pub const IDLE_MIN_MS: f64 = 1000.0;
pub const IDLE_MAX_MS: f64 = 3000.0;

/// How long a flee lasts once entered, ms.
pub const FLEE_DURATION_MS: f64 = 3000.0;

/// Flee speed relative to current move speed.
pub const FLEE_SPEED_MULTIPLIER: f64 = 1.2;

/// A chaser gives up only beyond sight range times this factor.
pub const CHASE_HYSTERESIS: f64 = 1.1;

// --- Combat ---

/// Projectile speed before the projectile speed modifier, px/s.
pub const DEFAULT_PROJECTILE_SPEED: f64 = 300.0;

/// Projectile type used when an attack names none.
pub const DEFAULT_PROJECTILE_TYPE: &str = "BULLET";

/// Distance in front of the shooter where projectiles appear, px.
pub const PROJECTILE_ORIGIN_OFFSET: f64 = 26.0;

/// Range used when a melee attack declares none, px.
pub const DEFAULT_MELEE_RANGE: f64 = 50.0;

/// Range used when a ranged attack declares none, px.
pub const DEFAULT_RANGED_RANGE: f64 = 200.0;

/// Mitigated damage never drops below `ceil(amount / DAMAGE_FLOOR_DIVISOR)`.
pub const DAMAGE_FLOOR_DIVISOR: f64 = 10.0;

/// Mitigated damage never drops below this absolute value.
pub const MIN_DAMAGE: f64 = 1.0;

/// Knockback impulse lifetime, ms. Decays linearly to zero.
pub const KNOCKBACK_DURATION_MS: f64 = 150.0;

/// Nearest-enemy search radius for player auto-attacks, px.
pub const PLAYER_AUTO_TARGET_RANGE: f64 = 300.0;

// --- Fallback records ---

/// Attack given to a player whose character lists no usable attack.
pub const FALLBACK_PLAYER_ATTACK: &str = "FIST_PUNCH";

pub const FALLBACK_ENEMY_HP: f64 = 10.0;
pub const FALLBACK_ENEMY_SPEED: f64 = 50.0;
pub const FALLBACK_ENEMY_MELEE_RANGE: f64 = 30.0;
pub const FALLBACK_ENEMY_DAMAGE: f64 = 5.0;
pub const FALLBACK_ENEMY_COOLDOWN_MS: f64 = 2000.0;
pub const FALLBACK_ENEMY_SIGHT: f64 = 300.0;

pub const DEFAULT_PLAYER_HP: f64 = 100.0;
pub const DEFAULT_PLAYER_SPEED: f64 = 200.0;
pub const DEFAULT_PLAYER_LUCK: f64 = 10.0;

// --- Loadout ---

/// Default per-entity cap on the number of attack instances.
pub const DEFAULT_MAX_ATTACKS_PER_ENTITY: usize = 6;
