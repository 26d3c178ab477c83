//! Durable record of a finished run.
//!
//! A run record captures what a run did (its phase history, its report or
//! the error that stopped it) in a versioned JSON document, so runs can be
//! audited after the process has exited.

use crate::core::{StateHistory, TargetReport};
use crate::pipeline::{PipelinePhase, RunFailure, RunSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

pub mod error;

pub use error::RecordError;

/// Version identifier for the run record format
pub const RECORD_VERSION: u32 = 1;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Completed,
    Failed,
}

/// Serializable summary of one run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    /// Record format version
    pub version: u32,

    pub run_id: Uuid,

    /// When the record was created
    pub timestamp: DateTime<Utc>,

    /// Source location the run read from
    pub source: String,

    pub outcome: RunOutcome,

    /// Complete phase history
    pub history: StateHistory<PipelinePhase>,

    /// Report of a completed run, or the degraded report of a run whose
    /// persistence failed
    pub report: Option<TargetReport>,

    /// `phase: cause` of a failed run
    pub error: Option<String>,
}

impl RunRecord {
    pub fn completed(source: impl Into<String>, summary: &RunSummary) -> Self {
        Self {
            version: RECORD_VERSION,
            run_id: summary.run_id,
            timestamp: Utc::now(),
            source: source.into(),
            outcome: RunOutcome::Completed,
            history: summary.history.clone(),
            report: Some(summary.report.clone()),
            error: None,
        }
    }

    pub fn failed(source: impl Into<String>, failure: &RunFailure) -> Self {
        Self {
            version: RECORD_VERSION,
            run_id: failure.run_id,
            timestamp: Utc::now(),
            source: source.into(),
            outcome: RunOutcome::Failed,
            history: failure.history.clone(),
            report: failure.degraded_report.as_deref().cloned(),
            error: Some(failure.to_string()),
        }
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        serde_json::to_string_pretty(self).map_err(RecordError::SerializationFailed)
    }

    /// Parse a record, rejecting versions this build cannot read.
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        let record: Self = serde_json::from_str(json).map_err(RecordError::DeserializationFailed)?;
        if record.version != RECORD_VERSION {
            return Err(RecordError::UnsupportedVersion {
                found: record.version,
                supported: RECORD_VERSION,
            });
        }
        Ok(record)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), RecordError> {
        let path = path.as_ref();
        let io_error = |source| RecordError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, self.to_json()?).map_err(io_error)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| RecordError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}
