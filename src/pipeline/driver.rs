//! The pipeline driver.
//!
//! A run walks the phases in order:
//!
//! ```text
//! Idle -> SourceOpened -> Tokenized -> Aggregated -> Reduced
//!      -> Projected -> Persisted -> Reported -> Closed
//! ```
//!
//! Any error moves the run to `Failed` and then `Closed`. The execution
//! context is released before `Closed` on both paths.

use super::builder::PipelineBuilder;
use super::context::{ExecutionContext, ReleaseCounter};
use super::error::{PipelineError, RunFailure};
use super::lifecycle::Lifecycle;
use super::partition::{aggregate_partitions, partition_records};
use super::phase::PipelinePhase;
use crate::core::{project, tree_reduce, GlobalCounts, StateHistory, TargetReport, Token};
use crate::io::{ReportRenderer, ResultSink, SourceReader};
use std::time::Instant;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

/// A configured word-count job.
///
/// Build one with [`Pipeline::builder`]. A pipeline can be run more than once;
/// every run gets its own execution context and run id.
pub struct Pipeline {
    pub(super) source: Box<dyn SourceReader>,
    pub(super) location: String,
    pub(super) targets: Vec<Token>,
    pub(super) sink: Option<Box<dyn ResultSink>>,
    pub(super) renderers: Vec<Box<dyn ReportRenderer>>,
    pub(super) workers: usize,
    pub(super) records_per_partition: usize,
}

/// Outcome of a run that reached `Reported` and closed.
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub report: TargetReport,
    pub counts: GlobalCounts,
    pub history: StateHistory<PipelinePhase>,
    /// Times the execution context was released during the run
    pub context_releases: usize,
    /// Number of partitions the source was split into
    pub partitions: usize,
    /// Number of input records (lines) read from the source
    pub records: usize,
}

struct Completed {
    report: TargetReport,
    counts: GlobalCounts,
    partitions: usize,
    records: usize,
}

/// What a failing run had reached when it stopped.
struct Progress {
    entering: PipelinePhase,
    degraded: Option<TargetReport>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn targets(&self) -> &[Token] {
        &self.targets
    }

    /// Execute one run from `Idle` to `Closed`.
    pub fn run(&mut self) -> Result<RunSummary, RunFailure> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id, source = %self.location);
        let _enter = span.enter();

        let releases = ReleaseCounter::default();
        let mut lifecycle = Lifecycle::new();
        let mut progress = Progress {
            entering: PipelinePhase::SourceOpened,
            degraded: None,
        };

        let outcome = match ExecutionContext::acquire(self.workers, releases.clone()) {
            Ok(context) => {
                info!(workers = context.workers(), "run started");
                let outcome = self.execute(run_id, &context, &mut lifecycle, &mut progress);
                context.release();
                outcome
            }
            Err(error) => Err(error),
        };

        match outcome.and_then(|completed| lifecycle.close().map(|()| completed)) {
            Ok(completed) => {
                info!(
                    distinct = completed.report.distinct_count,
                    total = completed.report.total_occurrences,
                    "run completed"
                );
                Ok(RunSummary {
                    run_id,
                    report: completed.report,
                    counts: completed.counts,
                    history: lifecycle.into_history(),
                    context_releases: releases.count(),
                    partitions: completed.partitions,
                    records: completed.records,
                })
            }
            Err(error) => {
                error!(phase = %progress.entering, %error, "run failed");
                lifecycle.fail();
                if let Err(error) = lifecycle.close() {
                    warn!(%error, "failed run could not be closed");
                }

                if progress.degraded.is_some() {
                    warn!("counts were computed but not persisted");
                }

                Err(RunFailure {
                    run_id,
                    phase: progress.entering,
                    error,
                    history: lifecycle.into_history(),
                    degraded_report: progress.degraded.map(Box::new),
                    context_releases: releases.count(),
                })
            }
        }
    }

    fn execute(
        &mut self,
        run_id: Uuid,
        context: &ExecutionContext,
        lifecycle: &mut Lifecycle,
        progress: &mut Progress,
    ) -> Result<Completed, PipelineError> {
        progress.entering = PipelinePhase::SourceOpened;
        let records = self.source.open(&self.location)?;
        let started = Instant::now();
        lifecycle.advance(PipelinePhase::SourceOpened)?;

        // reading, tokenizing and partition aggregation are one streaming step;
        // a read error fails the run in Tokenized, anything else in Aggregated
        progress.entering = PipelinePhase::Tokenized;
        let partitions = partition_records(records, &self.location, self.records_per_partition);
        let aggregation = context
            .install(|| aggregate_partitions(partitions))
            .map_err(|error| {
                if !matches!(error, PipelineError::SourceUnavailable(_)) {
                    progress.entering = PipelinePhase::Aggregated;
                }
                error
            })?;
        lifecycle.advance(PipelinePhase::Tokenized)?;
        progress.entering = PipelinePhase::Aggregated;
        lifecycle.advance(PipelinePhase::Aggregated)?;
        let partitions = aggregation.parts.len();
        let records = aggregation.records;
        info!(partitions, records, "source aggregated");

        progress.entering = PipelinePhase::Reduced;
        let counts = context.install(|| tree_reduce(aggregation.parts))?;
        lifecycle.advance(PipelinePhase::Reduced)?;
        info!(
            distinct = counts.len(),
            total = counts.total(),
            "partitions reduced"
        );

        progress.entering = PipelinePhase::Projected;
        let report = project(&counts, &self.targets)
            .with_run_id(run_id)
            .with_records(records);
        lifecycle.advance(PipelinePhase::Projected)?;

        progress.entering = PipelinePhase::Persisted;
        if let Some(sink) = self.sink.as_mut() {
            let location = sink.location();
            if let Err(source) = sink.write(&counts) {
                progress.degraded = Some(report.with_elapsed(started.elapsed()));
                return Err(PipelineError::SinkWriteError { location, source });
            }
            info!(%location, "counts persisted");
        } else {
            info!("no sink attached, persistence skipped");
        }
        lifecycle.advance(PipelinePhase::Persisted)?;

        progress.entering = PipelinePhase::Reported;
        let report = report.with_elapsed(started.elapsed());
        for renderer in &mut self.renderers {
            renderer
                .render(&report)
                .map_err(|source| PipelineError::ReportFailure {
                    renderer: renderer.name().to_string(),
                    source,
                })?;
        }
        lifecycle.advance(PipelinePhase::Reported)?;

        progress.entering = PipelinePhase::Closed;
        Ok(Completed {
            report,
            counts,
            partitions,
            records,
        })
    }
}
