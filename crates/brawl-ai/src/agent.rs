//! The view of one AI entity that behavior states read and steer.

use brawl_core::enums::AttackKind;
use brawl_core::flags::BehaviorFlags;
use brawl_core::types::{EntityId, Position, Velocity};
use glam::DVec2;
use rand::RngCore;

use crate::profiles::BehaviorProfile;

/// Attack entry point a behavior state may call.
pub trait CombatPort {
    /// Fire the first ready attack of `kind` or, failing that, of its area
    /// variant, aimed at `aim` when given. Returns `false` when nothing in
    /// that family was ready.
    fn attempt_attack(&mut self, kind: AttackKind, aim: Option<Position>) -> bool;

    /// Whether the entity carries any attack of `kind` or its area variant,
    /// ready or not.
    fn holds(&self, kind: AttackKind) -> bool;
}

/// What the agent knows about its current target this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSighting {
    pub id: EntityId,
    pub position: Position,
    pub active: bool,
}

/// Borrowed state of one AI entity for the duration of a behavior update.
pub struct AiAgent<'a> {
    pub position: Position,
    pub velocity: &'a mut Velocity,
    /// Unit vector the entity faces.
    pub facing: &'a mut DVec2,
    /// Current (modified) move speed, px/s.
    pub move_speed: f64,
    pub flags: BehaviorFlags,
    pub profile: &'a BehaviorProfile,
    pub target: Option<TargetSighting>,
    pub combat: &'a mut dyn CombatPort,
    pub rng: &'a mut dyn RngCore,
}

impl<'a> AiAgent<'a> {
    pub fn is_stunned(&self) -> bool {
        self.flags.contains(BehaviorFlags::STUNNED)
    }

    /// The target, if one exists and is still active.
    pub fn live_target(&self) -> Option<TargetSighting> {
        self.target.filter(|t| t.active)
    }

    /// Ranged reach, when the profile is ranged and a ranged attack is held.
    pub fn ranged_reach(&self) -> Option<f64> {
        self.profile
            .ranged_reach()
            .filter(|_| self.combat.holds(AttackKind::Ranged))
    }

    pub fn distance_to(&self, target: &TargetSighting) -> f64 {
        self.position.distance_to(&target.position)
    }

    pub fn face(&mut self, target: &TargetSighting) {
        let dir = self.position.direction_to(&target.position);
        if dir != DVec2::ZERO {
            *self.facing = dir;
        }
    }

    pub fn stop(&mut self) {
        self.velocity.stop();
    }

    pub fn move_toward(&mut self, target: &TargetSighting, speed: f64) {
        let dir = self.position.direction_to(&target.position);
        self.velocity.0 = dir * speed;
        self.face(target);
    }

    pub fn move_away(&mut self, target: &TargetSighting, speed: f64) {
        let dir = target.position.direction_to(&self.position);
        self.velocity.0 = dir * speed;
        if dir != DVec2::ZERO {
            *self.facing = dir;
        }
    }
}
