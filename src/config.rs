//! Run configuration
//!
//! A [`PipelineConfig`] is read from a TOML file (every field optional) and
//! then overridden by command-line flags.
//!
//! ```toml
//! source = "corpus/articles.txt"
//! targets = ["Vision", "Robotics"]
//! output = "out/counts"
//! format = "json"
//! workers = 4
//! ```

use crate::io::SinkFormat;
use crate::pipeline::DEFAULT_RECORDS_PER_PARTITION;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Targets reported when none are configured.
pub const DEFAULT_TARGETS: [&str; 5] = ["Recognition", "Vision", "Robotics", "Assistants", "Predictive"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Everything needed to assemble a pipeline from outside the library.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Location handed to the source reader
    pub source: Option<String>,
    pub targets: Vec<String>,
    /// Directory the global counts are written to; no sink when unset
    pub output: Option<PathBuf>,
    pub format: SinkFormat,
    /// Worker threads, 0 for one per CPU
    pub workers: usize,
    pub records_per_partition: usize,
    pub html_report: Option<PathBuf>,
    pub json_report: Option<PathBuf>,
    pub run_record: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: None,
            targets: DEFAULT_TARGETS.iter().map(|t| t.to_string()).collect(),
            output: None,
            format: SinkFormat::default(),
            workers: 0,
            records_per_partition: DEFAULT_RECORDS_PER_PARTITION,
            html_report: None,
            json_report: None,
            run_record: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// Check the config, reporting every problem at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        match self.source.as_deref() {
            None => problems.push("no source location given".to_string()),
            Some(source) if source.trim().is_empty() => {
                problems.push("source location is empty".to_string())
            }
            Some(_) => {}
        }

        if self.records_per_partition == 0 {
            problems.push("records_per_partition must be at least 1".to_string());
        }

        for target in &self.targets {
            if target.is_empty() {
                problems.push("target tokens must not be empty".to_string());
            } else if target.chars().any(char::is_whitespace) {
                problems.push(format!(
                    "target '{target}' contains whitespace and can never match a token"
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}
