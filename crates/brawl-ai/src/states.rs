//! Concrete enemy behavior states.
//!
//! Each update checks, in order: target validity, stun, the state's attack
//! range, then sight range. The first check that decides returns.

use brawl_core::enums::{AttackKind, BehaviorStateId};
use rand::Rng;

use crate::agent::AiAgent;
use crate::fsm::{State, StateMachine};

/// Closed set of behavior states.
#[derive(Debug, Clone, PartialEq)]
pub enum AiState {
    Idle { idle_until: f64 },
    Chasing,
    AttackingMelee,
    AttackingRanged,
    Fleeing { flee_until: f64 },
}

impl AiState {
    pub fn id(&self) -> BehaviorStateId {
        match self {
            AiState::Idle { .. } => BehaviorStateId::Idle,
            AiState::Chasing => BehaviorStateId::Chasing,
            AiState::AttackingMelee => BehaviorStateId::AttackingMelee,
            AiState::AttackingRanged => BehaviorStateId::AttackingRanged,
            AiState::Fleeing { .. } => BehaviorStateId::Fleeing,
        }
    }

    /// Every state an enemy can be in, freshly initialized.
    pub fn roster() -> [AiState; 5] {
        [
            AiState::Idle { idle_until: 0.0 },
            AiState::Chasing,
            AiState::AttackingMelee,
            AiState::AttackingRanged,
            AiState::Fleeing { flee_until: 0.0 },
        ]
    }
}

/// State machine with every enemy state registered and none active.
pub fn enemy_machine() -> StateMachine<BehaviorStateId, AiState> {
    let mut machine = StateMachine::new();
    for state in AiState::roster() {
        machine.add_state(state.id(), state);
    }
    machine
}

impl<'a> State<AiAgent<'a>> for AiState {
    type Id = BehaviorStateId;

    fn enter(&mut self, agent: &mut AiAgent<'a>, time: f64) {
        match self {
            AiState::Idle { idle_until } => {
                agent.stop();
                *idle_until = time + roll_idle(agent);
            }
            AiState::Chasing => {}
            AiState::AttackingMelee => {
                if let Some(target) = agent.live_target() {
                    agent.face(&target);
                }
            }
            AiState::AttackingRanged => {
                agent.stop();
                if let Some(target) = agent.live_target() {
                    agent.face(&target);
                }
            }
            AiState::Fleeing { flee_until } => {
                *flee_until = time + agent.profile.flee_duration_ms;
            }
        }
    }

    fn update(&mut self, agent: &mut AiAgent<'a>, time: f64, _delta: f64) -> Option<BehaviorStateId> {
        match self {
            AiState::Idle { idle_until } => update_idle(idle_until, agent, time),
            AiState::Chasing => update_chasing(agent),
            AiState::AttackingMelee => update_attacking(agent, AttackKind::Melee),
            AiState::AttackingRanged => update_attacking(agent, AttackKind::Ranged),
            AiState::Fleeing { flee_until } => update_fleeing(*flee_until, agent, time),
        }
    }
}

fn roll_idle(agent: &mut AiAgent<'_>) -> f64 {
    let (min, max) = (agent.profile.idle_min_ms, agent.profile.idle_max_ms);
    if max > min {
        agent.rng.gen_range(min..=max)
    } else {
        min
    }
}

fn update_idle(idle_until: &mut f64, agent: &mut AiAgent<'_>, time: f64) -> Option<BehaviorStateId> {
    agent.stop();

    let Some(target) = agent.live_target() else {
        if time >= *idle_until {
            *idle_until = time + roll_idle(agent);
        }
        return None;
    };

    if agent.is_stunned() {
        return None;
    }

    if agent.distance_to(&target) <= agent.profile.sight_range {
        return Some(BehaviorStateId::Chasing);
    }

    if time >= *idle_until {
        *idle_until = time + roll_idle(agent);
    }
    None
}

fn update_chasing(agent: &mut AiAgent<'_>) -> Option<BehaviorStateId> {
    let Some(target) = agent.live_target() else {
        return Some(BehaviorStateId::Idle);
    };

    if agent.is_stunned() {
        agent.stop();
        return None;
    }

    let distance = agent.distance_to(&target);
    if let Some(reach) = agent.ranged_reach() {
        if distance <= reach {
            return Some(BehaviorStateId::AttackingRanged);
        }
    }
    if distance <= agent.profile.melee_range {
        return Some(BehaviorStateId::AttackingMelee);
    }

    if distance > agent.profile.lose_sight_range() {
        return Some(BehaviorStateId::Idle);
    }

    let speed = agent.move_speed;
    agent.move_toward(&target, speed);
    None
}

fn update_attacking(agent: &mut AiAgent<'_>, kind: AttackKind) -> Option<BehaviorStateId> {
    let Some(target) = agent.live_target() else {
        return Some(BehaviorStateId::Idle);
    };

    if agent.is_stunned() {
        return Some(BehaviorStateId::Idle);
    }

    let distance = agent.distance_to(&target);
    let reach = match kind {
        AttackKind::Ranged => agent.ranged_reach(),
        _ => Some(agent.profile.melee_range),
    };
    if let Some(reach) = reach {
        if distance <= reach {
            agent.stop();
            agent.face(&target);
            agent.combat.attempt_attack(kind, Some(target.position));
            return None;
        }
    }

    if distance <= agent.profile.sight_range {
        Some(BehaviorStateId::Chasing)
    } else {
        Some(BehaviorStateId::Idle)
    }
}

fn update_fleeing(flee_until: f64, agent: &mut AiAgent<'_>, time: f64) -> Option<BehaviorStateId> {
    let Some(target) = agent.live_target() else {
        agent.stop();
        return Some(BehaviorStateId::Idle);
    };

    if time >= flee_until {
        return Some(BehaviorStateId::Idle);
    }

    if agent.is_stunned() {
        agent.stop();
        return None;
    }

    let speed = agent.move_speed * agent.profile.flee_speed_multiplier;
    agent.move_away(&target, speed);
    None
}
