//! Wordtally: partitioned word counting with an order-independent reduce
//!
//! Wordtally splits a text corpus into partitions, counts whitespace-delimited
//! tokens in each partition in parallel, merges the partition results into one
//! global mapping and reports the counts of a fixed list of target words.
//!
//! The counting logic is a pure core with no I/O; the pipeline driver is the
//! imperative shell that sequences it over a source, a sink and renderers.
//!
//! # Core Concepts
//!
//! - **Partition aggregation**: each partition folds its records into
//!   [`PartialCounts`] independently of every other partition
//! - **Global reduce**: partial counts are merged with integer addition, so
//!   the result does not depend on partition order or grouping
//! - **Projection**: the global counts are narrowed to a [`TargetReport`]
//!   that lists every requested target, found or not
//! - **Lifecycle**: a run moves through [`PipelinePhase`]s and always ends in
//!   `Closed`, with its execution context released exactly once
//!
//! # Example
//!
//! ```rust
//! use wordtally::io::{MemorySink, MemorySource};
//! use wordtally::Pipeline;
//!
//! let source = MemorySource::new().with_document(
//!     "corpus",
//!     ["Vision systems and Robotics", "Robotics enables Predictive maintenance"],
//! );
//! let sink = MemorySink::new();
//!
//! let mut pipeline = Pipeline::builder()
//!     .source(source)
//!     .location("corpus")
//!     .sink(sink.clone())
//!     .build()
//!     .unwrap();
//!
//! let summary = pipeline.run().unwrap();
//! assert_eq!(summary.report.count_for("Robotics"), Some(2));
//! assert_eq!(summary.report.count_for("Recognition"), Some(0));
//! assert_eq!(sink.last_written().unwrap().total(), 8);
//! ```

pub mod app;
pub mod config;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod record;

// Re-export commonly used types
pub use core::{GlobalCounts, PartialCounts, State, StateHistory, TargetReport};
pub use pipeline::{Pipeline, PipelineError, PipelinePhase, RunFailure, RunSummary};
