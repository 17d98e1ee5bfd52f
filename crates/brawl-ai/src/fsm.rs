//! Generic finite state machine.
//!
//! A machine owns a table of states keyed by id and at most one active
//! state. States receive the controlled entity on every hook; the machine
//! itself never inspects it.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::warn;

/// One behavior state for entities of type `E`.
pub trait State<E> {
    type Id: Copy + Eq + Hash + Debug;

    /// Called when this state becomes active.
    fn enter(&mut self, _entity: &mut E, _time: f64) {}

    /// Called once per frame while active. A returned id requests a
    /// transition; returning the current id or `None` stays put.
    fn update(&mut self, entity: &mut E, time: f64, delta: f64) -> Option<Self::Id>;

    /// Called when this state stops being active.
    fn exit(&mut self, _entity: &mut E) {}
}

/// A completed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<Id> {
    pub from: Option<Id>,
    pub to: Id,
}

pub struct StateMachine<Id, S> {
    states: HashMap<Id, S>,
    current: Option<Id>,
}

impl<Id, S> Default for StateMachine<Id, S> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
            current: None,
        }
    }
}

impl<Id, S> StateMachine<Id, S>
where
    Id: Copy + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a state. Replaces any state already under `id`.
    pub fn add_state(&mut self, id: Id, state: S) {
        self.states.insert(id, state);
    }

    pub fn current(&self) -> Option<Id> {
        self.current
    }

    pub fn state(&self, id: Id) -> Option<&S> {
        self.states.get(&id)
    }

    pub fn has_state(&self, id: Id) -> bool {
        self.states.contains_key(&id)
    }

    /// Switch to `id`: exit the old state, then enter the new one.
    ///
    /// Unknown ids log a warning and change nothing. Switching to the state
    /// that is already active is a no-op and does not re-run `enter`.
    pub fn set_state<E>(&mut self, id: Id, entity: &mut E, time: f64) -> Option<Transition<Id>>
    where
        S: State<E, Id = Id>,
    {
        if !self.states.contains_key(&id) {
            warn!(state = ?id, "ignoring transition to unregistered state");
            return None;
        }
        if self.current == Some(id) {
            return None;
        }

        let from = self.current;
        if let Some(old) = from.and_then(|old| self.states.get_mut(&old)) {
            old.exit(entity);
        }
        self.current = Some(id);
        if let Some(next) = self.states.get_mut(&id) {
            next.enter(entity, time);
        }
        Some(Transition { from, to: id })
    }

    /// Run the active state's update and apply any requested transition.
    pub fn update<E>(&mut self, entity: &mut E, time: f64, delta: f64) -> Option<Transition<Id>>
    where
        S: State<E, Id = Id>,
    {
        let current = self.current?;
        let requested = self.states.get_mut(&current)?.update(entity, time, delta)?;
        if requested == current {
            return None;
        }
        self.set_state(requested, entity, time)
    }
}
