//! Lifecycle phases of a pipeline run.

use crate::core::State;

crate::phase_enum! {
    /// Phases a run moves through, in order.
    ///
    /// `Failed` can be entered from any phase before `Closed`; a failed run
    /// still moves on to `Closed` once its execution context is released.
    pub enum PipelinePhase {
        Idle,
        SourceOpened,
        Tokenized,
        Aggregated,
        Reduced,
        Projected,
        Persisted,
        Reported,
        Closed,
        Failed,
    }
    final: [Closed]
    error: [Failed]
}

impl PipelinePhase {
    /// Next phase on the success path.
    pub fn successor(&self) -> Option<PipelinePhase> {
        match self {
            PipelinePhase::Closed | PipelinePhase::Failed => None,
            _ => Self::ALL.get(self.ordinal() + 1).copied(),
        }
    }

    /// Whether the lifecycle may move from `self` to `next`.
    pub fn can_transition_to(&self, next: &PipelinePhase) -> bool {
        match (self, next) {
            (PipelinePhase::Closed, _) => false,
            (PipelinePhase::Failed, PipelinePhase::Closed) => true,
            (PipelinePhase::Failed, _) => false,
            (_, PipelinePhase::Failed) => true,
            (from, to) => from.successor().as_ref() == Some(to),
        }
    }

    /// Whether the phase is still part of an active run.
    pub fn is_active(&self) -> bool {
        !self.is_final() && !self.is_error()
    }
}
