//! Phase tracking for a single run.

use super::error::PipelineError;
use super::phase::PipelinePhase;
use crate::core::{State, StateHistory, StateTransition};
use chrono::Utc;
use tracing::{info, warn};

/// Current phase plus the timestamped path that led to it.
///
/// Every move is validated against [`PipelinePhase::can_transition_to`], so
/// no phase is skipped or revisited within a run.
#[derive(Debug)]
pub struct Lifecycle {
    current: PipelinePhase,
    history: StateHistory<PipelinePhase>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Start a lifecycle in `Idle`.
    pub fn new() -> Self {
        Self {
            current: PipelinePhase::Idle,
            history: StateHistory::new(),
        }
    }

    pub fn current_phase(&self) -> PipelinePhase {
        self.current
    }

    pub fn history(&self) -> &StateHistory<PipelinePhase> {
        &self.history
    }

    pub fn is_final(&self) -> bool {
        self.current.is_final()
    }

    /// Move to `to`, recording the transition.
    pub fn advance(&mut self, to: PipelinePhase) -> Result<(), PipelineError> {
        if !self.current.can_transition_to(&to) {
            return Err(PipelineError::IllegalTransition {
                from: self.current,
                to,
            });
        }

        info!(from = %self.current, to = %to, "phase transition");
        self.history = self.history.record(StateTransition {
            from: self.current,
            to,
            timestamp: Utc::now(),
        });
        self.current = to;
        Ok(())
    }

    /// Enter `Failed` from wherever the run currently is.
    ///
    /// Does nothing if the run already failed or closed.
    pub fn fail(&mut self) {
        if self.current.is_active() {
            warn!(phase = %self.current, "run failed");
            if let Err(error) = self.advance(PipelinePhase::Failed) {
                warn!(%error, "could not record the failure");
            }
        }
    }

    /// Enter `Closed` after a report or a failure.
    pub fn close(&mut self) -> Result<(), PipelineError> {
        self.advance(PipelinePhase::Closed)
    }

    /// Consume the lifecycle, keeping its history.
    pub fn into_history(self) -> StateHistory<PipelinePhase> {
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive_to(lifecycle: &mut Lifecycle, target: PipelinePhase) {
        while lifecycle.current_phase() != target {
            let next = lifecycle.current_phase().successor().unwrap();
            lifecycle.advance(next).unwrap();
        }
    }

    #[test]
    fn full_success_path_is_recorded() {
        let mut lifecycle = Lifecycle::new();
        drive_to(&mut lifecycle, PipelinePhase::Closed);

        assert!(lifecycle.is_final());
        let path = lifecycle.history().get_path();
        assert_eq!(path.len(), 9);
        assert_eq!(path[0], &PipelinePhase::Idle);
        assert_eq!(path[8], &PipelinePhase::Closed);
    }

    #[test]
    fn illegal_transition_is_rejected_without_recording() {
        let mut lifecycle = Lifecycle::new();
        let err = lifecycle.advance(PipelinePhase::Reduced).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::IllegalTransition {
                from: PipelinePhase::Idle,
                to: PipelinePhase::Reduced
            }
        ));
        assert_eq!(lifecycle.current_phase(), PipelinePhase::Idle);
        assert!(lifecycle.history().transitions().is_empty());
    }

    #[test]
    fn failure_then_close() {
        let mut lifecycle = Lifecycle::new();
        drive_to(&mut lifecycle, PipelinePhase::Aggregated);

        lifecycle.fail();
        assert_eq!(lifecycle.current_phase(), PipelinePhase::Failed);
        lifecycle.close().unwrap();

        let path = lifecycle.into_history();
        let tail: Vec<&PipelinePhase> = path.get_path().into_iter().rev().take(3).collect();
        assert_eq!(
            tail,
            vec![
                &PipelinePhase::Closed,
                &PipelinePhase::Failed,
                &PipelinePhase::Aggregated
            ]
        );
    }

    #[test]
    fn fail_is_a_no_op_once_closed() {
        let mut lifecycle = Lifecycle::new();
        drive_to(&mut lifecycle, PipelinePhase::Closed);

        lifecycle.fail();
        assert_eq!(lifecycle.current_phase(), PipelinePhase::Closed);
    }
}
