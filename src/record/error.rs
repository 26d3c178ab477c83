//! Run record error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing or loading a run record
#[derive(Debug, Error)]
pub enum RecordError {
    /// Serialization to JSON failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(#[source] serde_json::Error),

    /// Deserialization from JSON failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(#[source] serde_json::Error),

    /// Record version is not supported by this version
    #[error("Unsupported run record version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Cannot access run record {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
