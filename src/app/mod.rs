//! Application layer
//!
//! Assembles a [`Pipeline`] from a [`PipelineConfig`], runs it and turns the
//! outcome into console output and an exit code.

pub mod logging;

pub use logging::init_logging;

use crate::config::PipelineConfig;
use crate::io::{
    ConsoleRenderer, DirectorySink, FileSource, HtmlRenderer, JsonRenderer, ReportError,
};
use crate::pipeline::{BuildError, Pipeline, RunFailure};
use crate::record::RunRecord;
use std::io::{self, Write};
use tracing::{error, info, warn};

/// Every phase completed.
pub const EXIT_SUCCESS: i32 = 0;
/// The run entered `Failed`.
pub const EXIT_RUN_FAILED: i32 = 1;
/// The configuration was rejected before a run started.
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Assemble a file-backed pipeline from `config`.
pub fn build_pipeline(config: &PipelineConfig) -> Result<Pipeline, BuildError> {
    let location = config.source.clone().ok_or(BuildError::MissingLocation)?;

    let mut builder = Pipeline::builder()
        .source(FileSource)
        .location(location.clone())
        .targets(config.targets.iter().cloned())
        .workers(config.workers)
        .records_per_partition(config.records_per_partition)
        .renderer(ConsoleRenderer::stdout());

    if let Some(output) = &config.output {
        builder = builder.sink(DirectorySink::new(output, config.format));
    }
    if let Some(path) = &config.html_report {
        builder = builder
            .renderer(HtmlRenderer::new(path).with_title(format!("Word Count Report: {location}")));
    }
    if let Some(path) = &config.json_report {
        builder = builder.renderer(JsonRenderer::new(path));
    }

    builder.build()
}

/// Run the pipeline described by `config` and return the process exit code.
pub fn run(config: &PipelineConfig) -> i32 {
    let mut pipeline = match build_pipeline(config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("error: {e}");
            return EXIT_CONFIG_ERROR;
        }
    };

    let outcome = pipeline.run();

    if let Some(path) = &config.run_record {
        let record = match &outcome {
            Ok(summary) => RunRecord::completed(pipeline.location(), summary),
            Err(failure) => RunRecord::failed(pipeline.location(), failure),
        };
        match record.write_to(path) {
            Ok(()) => info!(path = %path.display(), "run record written"),
            Err(e) => warn!("could not write run record: {}", e),
        }
    }

    match outcome {
        Ok(_) => EXIT_SUCCESS,
        Err(failure) => {
            if let Err(e) = report_failure(&failure, &mut io::stderr(), io::stdout()) {
                error!("could not print failure details: {}", e);
            }
            EXIT_RUN_FAILED
        }
    }
}

/// Print a failed run: the failing phase and cause to `diagnostics`, and the
/// degraded report, if there is one, to `console`.
///
/// A failed run never prints a normal report.
pub fn report_failure<D, C>(
    failure: &RunFailure,
    diagnostics: &mut D,
    console: C,
) -> Result<(), ReportError>
where
    D: Write,
    C: Write + Send,
{
    writeln!(diagnostics, "error: {failure}")?;

    if let Some(report) = failure.degraded_report.as_deref() {
        warn!("printing degraded report");
        ConsoleRenderer::new(console).render_degraded(report, &failure.error.to_string())?;
    }
    Ok(())
}
