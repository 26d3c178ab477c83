//! Collaborators at the edge of the pipeline.
//!
//! The driver only depends on the three traits below; the adapters in this
//! module are the implementations the binary and tests use.
//!
//! - [`SourceReader`]: location to records
//! - [`ResultSink`]: durable copy of the global counts
//! - [`ReportRenderer`]: human-readable report

mod error;
mod report;
mod sink;
mod source;

pub use error::{ReportError, SinkError, SourceError};
pub use report::{ConsoleRenderer, HtmlRenderer, JsonRenderer, ReportRenderer};
pub use sink::{DirectorySink, MemorySink, ResultSink, SinkFormat, SUCCESS_MARKER};
pub use source::{FileSource, MemorySource, Records, SourceReader};
