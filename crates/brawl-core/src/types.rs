//! Fundamental geometric and simulation types.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Stable identifier the host uses to address an entity.
///
/// Assigned by the engine at spawn time and never reused within a session.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 2D position in world space (pixels, top-down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub DVec2);

/// 2D velocity in world space (pixels per second).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub DVec2);

/// Simulation clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of frames simulated so far.
    pub frame: u64,
    /// Absolute simulation time in milliseconds.
    pub now_ms: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    /// Straight-line distance to another position.
    pub fn distance_to(&self, other: &Position) -> f64 {
        self.0.distance(other.0)
    }

    /// Unit vector pointing at `other`, or zero when the points coincide.
    pub fn direction_to(&self, other: &Position) -> DVec2 {
        (other.0 - self.0).normalize_or_zero()
    }

    /// Angle toward `other` in radians, measured from +x toward +y.
    pub fn angle_to(&self, other: &Position) -> f64 {
        let d = other.0 - self.0;
        d.y.atan2(d.x)
    }
}

impl Velocity {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    pub fn zero() -> Self {
        Self(DVec2::ZERO)
    }

    /// Speed magnitude.
    pub fn speed(&self) -> f64 {
        self.0.length()
    }

    pub fn is_zero(&self) -> bool {
        self.0 == DVec2::ZERO
    }

    pub fn stop(&mut self) {
        self.0 = DVec2::ZERO;
    }
}

impl SimTime {
    /// Advance the clock by one frame of `delta_ms` milliseconds.
    pub fn advance(&mut self, delta_ms: f64) {
        self.frame += 1;
        self.now_ms += delta_ms;
    }
}
