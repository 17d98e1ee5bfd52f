//! Per-entity AI component: a state machine plus the profile it runs with.

use brawl_core::enums::BehaviorStateId;
use brawl_core::flags::BehaviorFlags;
use brawl_core::types::{EntityId, Position, Velocity};
use glam::DVec2;
use rand::RngCore;

use crate::agent::{AiAgent, CombatPort, TargetSighting};
use crate::fsm::{StateMachine, Transition};
use crate::profiles::BehaviorProfile;
use crate::states::{enemy_machine, AiState};

/// What the world provides to a brain for one update.
pub struct BrainInput<'a> {
    pub position: Position,
    pub velocity: &'a mut Velocity,
    pub move_speed: f64,
    pub flags: BehaviorFlags,
    pub target: Option<TargetSighting>,
    pub combat: &'a mut dyn CombatPort,
    pub rng: &'a mut dyn RngCore,
}

pub struct Brain {
    pub machine: StateMachine<BehaviorStateId, AiState>,
    pub profile: BehaviorProfile,
    /// Unit vector the entity faces.
    pub facing: DVec2,
    /// Target chosen on the last update.
    pub target: Option<EntityId>,
    /// Transition forced from outside, applied on the next update.
    pending: Option<BehaviorStateId>,
}

impl Brain {
    /// A brain that enters Idle on its first update.
    pub fn new(profile: BehaviorProfile) -> Self {
        Self {
            machine: enemy_machine(),
            profile,
            facing: DVec2::X,
            target: None,
            pending: Some(BehaviorStateId::Idle),
        }
    }

    pub fn state(&self) -> Option<BehaviorStateId> {
        self.machine.current()
    }

    /// Force a transition on the next update (e.g. fear).
    pub fn request(&mut self, state: BehaviorStateId) {
        self.pending = Some(state);
    }

    /// Apply any pending transition, then run the active state once.
    pub fn step(
        &mut self,
        input: BrainInput<'_>,
        now: f64,
        delta: f64,
    ) -> Vec<Transition<BehaviorStateId>> {
        self.target = input.target.map(|t| t.id);

        let mut agent = AiAgent {
            position: input.position,
            velocity: input.velocity,
            facing: &mut self.facing,
            move_speed: input.move_speed,
            flags: input.flags,
            profile: &self.profile,
            target: input.target,
            combat: input.combat,
            rng: input.rng,
        };

        let mut transitions = Vec::new();
        if let Some(forced) = self.pending.take() {
            transitions.extend(self.machine.set_state(forced, &mut agent, now));
        }
        transitions.extend(self.machine.update(&mut agent, now, delta));
        transitions
    }
}
