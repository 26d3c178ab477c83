//! Builder for constructing pipelines.

use super::driver::Pipeline;
use crate::config::DEFAULT_TARGETS;
use crate::core::Token;
use crate::io::{ReportRenderer, ResultSink, SourceReader};
use thiserror::Error;

/// Records per partition when none is configured.
pub const DEFAULT_RECORDS_PER_PARTITION: usize = 4096;

/// Errors that can occur when building a pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Source reader not specified. Call .source(reader) before .build()")]
    MissingSource,

    #[error("Source location not specified. Call .location(location) before .build()")]
    MissingLocation,

    #[error("records_per_partition must be at least 1")]
    EmptyPartitions,
}

/// Builder for [`Pipeline`] with a fluent API.
///
/// Targets default to the five standard target words, workers to one per
/// CPU and partitions to [`DEFAULT_RECORDS_PER_PARTITION`] records.
pub struct PipelineBuilder {
    source: Option<Box<dyn SourceReader>>,
    location: Option<String>,
    targets: Option<Vec<Token>>,
    sink: Option<Box<dyn ResultSink>>,
    renderers: Vec<Box<dyn ReportRenderer>>,
    workers: usize,
    records_per_partition: usize,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            source: None,
            location: None,
            targets: None,
            sink: None,
            renderers: Vec::new(),
            workers: 0,
            records_per_partition: DEFAULT_RECORDS_PER_PARTITION,
        }
    }

    /// Set the source reader (required).
    pub fn source(mut self, source: impl SourceReader + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Set the location handed to the source reader (required).
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Replace the target tokens.
    pub fn targets<I, T>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        self.targets = Some(targets.into_iter().map(Into::into).collect());
        self
    }

    /// Persist the global counts to `sink` before reporting.
    pub fn sink(mut self, sink: impl ResultSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Add a renderer; renderers run in the order they were added.
    pub fn renderer(mut self, renderer: impl ReportRenderer + 'static) -> Self {
        self.renderers.push(Box::new(renderer));
        self
    }

    /// Worker threads for the execution context; 0 means one per CPU.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn records_per_partition(mut self, records: usize) -> Self {
        self.records_per_partition = records;
        self
    }

    /// Build the pipeline.
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<Pipeline, BuildError> {
        let source = self.source.ok_or(BuildError::MissingSource)?;
        let location = self.location.ok_or(BuildError::MissingLocation)?;

        if self.records_per_partition == 0 {
            return Err(BuildError::EmptyPartitions);
        }

        let targets = self
            .targets
            .unwrap_or_else(|| DEFAULT_TARGETS.iter().map(|t| t.to_string()).collect());

        Ok(Pipeline {
            source,
            location,
            targets,
            sink: self.sink,
            renderers: self.renderers,
            workers: self.workers,
            records_per_partition: self.records_per_partition,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
