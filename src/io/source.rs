//! Source readers.

use super::error::SourceError;
use crate::core::Record;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Finite, lazily read sequence of records.
pub type Records = Box<dyn Iterator<Item = io::Result<Record>> + Send>;

/// Opens a location and yields its records.
pub trait SourceReader: Send + Sync {
    /// Open `location` for reading.
    ///
    /// Fails with [`SourceError`] when the location cannot be opened. Read
    /// errors after opening are yielded by the returned iterator.
    fn open(&self, location: &str) -> Result<Records, SourceError>;
}

/// Reads newline-delimited text from the local filesystem.
///
/// A leading `file://` is accepted and stripped.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileSource;

impl FileSource {
    fn resolve(location: &str) -> &Path {
        Path::new(location.strip_prefix("file://").unwrap_or(location))
    }
}

impl SourceReader for FileSource {
    fn open(&self, location: &str) -> Result<Records, SourceError> {
        let path = Self::resolve(location);
        let file = File::open(path).map_err(|source| SourceError::Open {
            location: location.to_string(),
            source,
        })?;

        let metadata = file.metadata().map_err(|source| SourceError::Open {
            location: location.to_string(),
            source,
        })?;
        if metadata.is_dir() {
            return Err(SourceError::NotAFile {
                location: location.to_string(),
            });
        }

        let records = BufReader::new(file)
            .lines()
            .enumerate()
            .map(|(line, text)| text.map(|text| Record::new(line, text)));
        Ok(Box::new(records))
    }
}

/// Serves named in-memory documents.
///
/// ```
/// use wordtally::io::{MemorySource, SourceReader};
///
/// let source = MemorySource::new().with_document("mem://a", ["one two", "three"]);
/// let lines = source.open("mem://a").unwrap().count();
/// assert_eq!(lines, 2);
/// assert!(source.open("mem://missing").is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    documents: HashMap<String, Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document<I, L>(mut self, location: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.documents
            .insert(location.into(), lines.into_iter().map(Into::into).collect());
        self
    }
}

impl SourceReader for MemorySource {
    fn open(&self, location: &str) -> Result<Records, SourceError> {
        let lines = self
            .documents
            .get(location)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                location: location.to_string(),
            })?;

        Ok(Box::new(
            lines
                .into_iter()
                .enumerate()
                .map(|(line, text)| Ok(Record::new(line, text))),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_source_reads_lines_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Application.txt");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "Vision and Robotics").unwrap();
        writeln!(file, "Robotics enables Predictive maintenance").unwrap();

        let records: Vec<Record> = FileSource
            .open(path.to_str().unwrap())
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line(), 0);
        assert_eq!(records[1].text(), "Robotics enables Predictive maintenance");
    }

    #[test]
    fn file_source_accepts_file_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.txt");
        std::fs::write(&path, "a b\n").unwrap();

        let location = format!("file://{}", path.display());
        assert_eq!(FileSource.open(&location).unwrap().count(), 1);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = FileSource.open("/definitely/not/here.txt").err().unwrap();
        assert!(matches!(err, SourceError::Open { .. }));
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSource.open(dir.path().to_str().unwrap()).err().unwrap();
        assert!(matches!(err, SourceError::NotAFile { .. }));
    }

    #[test]
    fn invalid_utf8_surfaces_as_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0x66, 0x6f, 0xff, 0xfe, b'\n']).unwrap();

        let first = FileSource.open(path.to_str().unwrap()).unwrap().next();
        assert!(matches!(first, Some(Err(_))));
    }

    #[test]
    fn memory_source_unknown_location_is_unavailable() {
        let err = MemorySource::new().open("mem://nothing").err().unwrap();
        assert!(matches!(err, SourceError::NotFound { .. }));
    }
}
