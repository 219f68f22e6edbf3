//! Access flow state machine.
//!
//! # States
//!
//! - `AwaitingEntry`: prompting for a code and collecting keypresses
//! - `Validating`: comparing a complete entry against the credential
//! - `Lockout`: too many wrong codes, alarm held for the cooldown
//!
//! # Valid Transitions
//!
//! - AwaitingEntry → Validating → AwaitingEntry
//! - AwaitingEntry → Lockout → AwaitingEntry
//!
//! # Examples
//!
//! ```
//! use doorlock_controller::{AccessState, StateMachine};
//!
//! let mut machine = StateMachine::new();
//! assert_eq!(machine.current_state(), AccessState::AwaitingEntry);
//!
//! machine.transition_to(AccessState::Validating).unwrap();
//! assert!(machine.transition_to(AccessState::Lockout).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;

use doorlock_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum number of state transitions kept in history.
///
/// A complete access cycle records two transitions, so this covers the last
/// fifty attempts or lockouts.
const MAX_HISTORY_SIZE: usize = 100;

/// Phase of the access flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    /// Prompting for a code and collecting keypresses.
    #[default]
    AwaitingEntry,

    /// Comparing a complete entry against the credential.
    Validating,

    /// Too many wrong codes; keypad ignored until the cooldown ends.
    Lockout,
}

impl fmt::Display for AccessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            AccessState::AwaitingEntry => "AwaitingEntry",
            AccessState::Validating => "Validating",
            AccessState::Lockout => "Lockout",
        };
        write!(f, "{}", state_str)
    }
}

impl AccessState {
    /// Check if a transition to `target` is allowed from this state.
    ///
    /// ```
    /// use doorlock_controller::AccessState;
    ///
    /// assert!(AccessState::AwaitingEntry.can_transition_to(&AccessState::Lockout));
    /// assert!(!AccessState::Lockout.can_transition_to(&AccessState::Validating));
    /// ```
    pub fn can_transition_to(&self, target: &AccessState) -> bool {
        matches!(
            (self, target),
            (
                AccessState::AwaitingEntry,
                AccessState::Validating | AccessState::Lockout
            ) | (AccessState::Validating, AccessState::AwaitingEntry)
                | (AccessState::Lockout, AccessState::AwaitingEntry)
        )
    }
}

/// A single state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: AccessState,
    pub to: AccessState,
}

impl StateTransition {
    pub fn new(from: AccessState, to: AccessState) -> Self {
        Self { from, to }
    }
}

/// State machine enforcing the access flow and recording its history.
#[derive(Debug)]
pub struct StateMachine {
    current_state: AccessState,
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    /// Create a machine in `AwaitingEntry` with empty history.
    pub fn new() -> Self {
        Self {
            current_state: AccessState::AwaitingEntry,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> AccessState {
        self.current_state
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// The last `count` transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).copied().collect()
    }

    /// Transition to `new_state`, validating the move.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the move is not allowed
    /// from the current state. The machine is left unchanged in that case.
    pub fn transition_to(&mut self, new_state: AccessState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        debug!(from = %self.current_state, to = %new_state, "State transition");

        self.record(transition);
        Ok(transition)
    }

    /// Return to `AwaitingEntry` after a cycle was abandoned mid-state.
    ///
    /// Returns the recorded transition, or `None` if the machine was
    /// already awaiting entry.
    pub fn reset(&mut self) -> Option<StateTransition> {
        if self.current_state == AccessState::AwaitingEntry {
            return None;
        }
        let transition = StateTransition::new(self.current_state, AccessState::AwaitingEntry);
        debug!(from = %self.current_state, "State reset");

        self.record(transition);
        Some(transition)
    }

    fn record(&mut self, transition: StateTransition) {
        self.current_state = transition.to;
        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
