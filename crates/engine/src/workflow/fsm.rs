// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Table-driven state machine shared by the workflows.

use crate::error::Error;
use std::fmt::{Debug, Display};

/// States, events and the transition table of one workflow.
pub trait Machine {
    type State: Copy + Eq + Debug + Display;
    type Event: Copy + Eq + Debug + Display;

    const INITIAL: Self::State;

    /// Target of `event` from `state`, or `None` when the transition is not
    /// allowed.
    fn next(state: Self::State, event: Self::Event) -> Option<Self::State>;
}

/// Current state plus every state visited, in order.
pub struct Fsm<M: Machine> {
    state: M::State,
    history: Vec<M::State>,
}

impl<M: Machine> Default for Fsm<M> {
    fn default() -> Self {
        Self { state: M::INITIAL, history: vec![M::INITIAL] }
    }
}

impl<M: Machine> Fsm<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> M::State {
        self.state
    }

    pub fn history(&self) -> &[M::State] {
        &self.history
    }

    pub fn into_history(self) -> Vec<M::State> {
        self.history
    }

    pub fn can(&self, event: M::Event) -> bool {
        M::next(self.state, event).is_some()
    }

    pub fn fire(&mut self, event: M::Event) -> Result<M::State, Error> {
        let Some(next) = M::next(self.state, event) else {
            return Err(Error::InvalidTransition {
                state: self.state.to_string(),
                event: event.to_string(),
            });
        };
        tracing::debug!(from = %self.state, to = %next, %event, "transition");
        self.state = next;
        self.history.push(next);
        Ok(next)
    }
}

#[cfg(test)]
#[path = "fsm_tests.rs"]
mod tests;
