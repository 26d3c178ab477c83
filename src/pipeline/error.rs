//! Driver-level errors and the failure outcome of a run.

use super::phase::PipelinePhase;
use crate::core::{AggregationError, StateHistory, TargetReport};
use crate::io::{ReportError, SinkError, SourceError};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Why a run failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    #[error("failed to persist counts to {location}: {source}")]
    SinkWriteError {
        location: String,
        #[source]
        source: SinkError,
    },

    #[error("aggregation failure: {0}")]
    AggregationFailure(#[from] AggregationError),

    #[error("execution context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("renderer '{renderer}' failed: {source}")]
    ReportFailure {
        renderer: String,
        #[source]
        source: ReportError,
    },

    #[error("partition {partition} was cancelled without a recorded cause")]
    Cancelled { partition: usize },

    #[error("illegal phase transition from {from} to {to}")]
    IllegalTransition {
        from: PipelinePhase,
        to: PipelinePhase,
    },
}

/// Outcome of a run that entered `Failed`.
///
/// By the time a caller sees this, the execution context has been released
/// and the lifecycle has reached `Closed`.
#[derive(Debug)]
pub struct RunFailure {
    pub run_id: Uuid,
    /// Phase the run was trying to enter when it failed
    pub phase: PipelinePhase,
    pub error: PipelineError,
    pub history: StateHistory<PipelinePhase>,
    /// Report computed before a persistence failure, for explicit degraded output
    pub degraded_report: Option<Box<TargetReport>>,
    /// Times the execution context was released during the run
    pub context_releases: usize,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.phase, self.error)
    }
}

impl std::error::Error for RunFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
