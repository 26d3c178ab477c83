//! Errors raised by the source, sink and report adapters.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open '{location}': {source}")]
    Open {
        location: String,
        #[source]
        source: io::Error,
    },

    #[error("'{location}' is not a regular file")]
    NotAFile { location: String },

    #[error("no document named '{location}'")]
    NotFound { location: String },

    #[error("failed reading '{location}' at line {line}: {source}")]
    Read {
        location: String,
        line: usize,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error writing '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("refusing to overwrite '{}': it does not look like a previous result directory", path.display())]
    RefuseOverwrite { path: PathBuf },

    #[error("failed to encode counts as {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    #[error("failed to decode '{}': {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

impl SinkError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SinkError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error writing report: {0}")]
    Io(#[from] io::Error),

    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}
