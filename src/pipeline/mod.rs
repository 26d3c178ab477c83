//! The pipeline driver and its lifecycle.
//!
//! [`Pipeline`] owns the collaborators of a run and sequences the pure core
//! over them. Each run acquires its own [`ExecutionContext`], tracks its
//! progress through [`PipelinePhase`]s and ends in either a [`RunSummary`]
//! or a [`RunFailure`].

mod builder;
mod context;
mod driver;
mod error;
mod lifecycle;
mod partition;
mod phase;

pub use builder::{BuildError, PipelineBuilder, DEFAULT_RECORDS_PER_PARTITION};
pub use context::{ExecutionContext, ReleaseCounter};
pub use driver::{Pipeline, RunSummary};
pub use error::{PipelineError, RunFailure};
pub use lifecycle::Lifecycle;
pub use partition::{aggregate_partitions, partition_records, Aggregation, Partition, Partitions};
pub use phase::PipelinePhase;
