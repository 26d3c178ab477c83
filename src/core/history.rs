//! Transition history for a run's lifecycle.
//!
//! The history is append-only: `record` returns a new history with the
//! transition added and leaves the original untouched.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single lifecycle transition.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being left
    pub from: S,
    /// The state being entered
    pub to: S,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of lifecycle transitions.
///
/// # Example
///
/// ```rust
/// use wordtally::core::{State, StateHistory, StateTransition};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Step { Open, Count, Close }
///
/// impl State for Step {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "Open",
///             Self::Count => "Count",
///             Self::Close => "Close",
///         }
///     }
/// }
///
/// let history = StateHistory::new()
///     .record(StateTransition { from: Step::Open, to: Step::Count, timestamp: Utc::now() })
///     .record(StateTransition { from: Step::Count, to: Step::Close, timestamp: Utc::now() });
///
/// assert_eq!(history.get_path(), vec![&Step::Open, &Step::Count, &Step::Close]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// States traversed in order: the first `from`, then every `to`.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Whether `state` appears anywhere on the path.
    pub fn visited(&self, state: &S) -> bool {
        self.get_path().into_iter().any(|s| s == state)
    }

    /// The most recently entered state, if any transition was recorded.
    pub fn last_state(&self) -> Option<&S> {
        self.transitions.last().map(|t| &t.to)
    }

    /// Wall-clock span between the first and last transition.
    ///
    /// Returns `None` for an empty history or when the clock went backwards.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all transitions in order.
    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }
}
