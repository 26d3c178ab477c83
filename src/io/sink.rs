//! Result sinks for the global counts.

use super::error::SinkError;
use crate::core::{CountEntry, GlobalCounts};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Name of the marker file written after a complete result directory.
pub const SUCCESS_MARKER: &str = "_SUCCESS";

const PART_PREFIX: &str = "part-";

/// Writes a finished mapping somewhere durable.
pub trait ResultSink: Send {
    /// Write `counts`, replacing whatever the location held before.
    fn write(&mut self, counts: &GlobalCounts) -> Result<(), SinkError>;

    /// Human-readable destination, for logs and diagnostics.
    fn location(&self) -> String;
}

/// Encoding of persisted `(token, count)` entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkFormat {
    /// One `token<TAB>count` line per entry
    #[default]
    Text,
    /// A JSON object from token to count
    Json,
    /// A bincode-encoded list of entries
    Bincode,
}

impl SinkFormat {
    fn part_file(&self) -> &'static str {
        match self {
            SinkFormat::Text => "part-00000",
            SinkFormat::Json => "part-00000.json",
            SinkFormat::Bincode => "part-00000.bin",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SinkFormat::Text => "text",
            SinkFormat::Json => "json",
            SinkFormat::Bincode => "bincode",
        }
    }
}

impl fmt::Display for SinkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SinkFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(SinkFormat::Text),
            "json" => Ok(SinkFormat::Json),
            "bincode" | "bin" => Ok(SinkFormat::Bincode),
            other => Err(format!(
                "unknown format '{other}' (expected text, json or bincode)"
            )),
        }
    }
}

/// Writes a result directory: one part file plus a `_SUCCESS` marker.
///
/// Entries are sorted by token, so two runs over the same input produce
/// byte-identical part files.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    format: SinkFormat,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>, format: SinkFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> SinkFormat {
        self.format
    }

    /// Read a result directory written by this sink back into counts.
    pub fn load(dir: impl AsRef<Path>, format: SinkFormat) -> Result<GlobalCounts, SinkError> {
        let path = dir.as_ref().join(format.part_file());
        let bytes = fs::read(&path).map_err(|e| SinkError::io(&path, e))?;
        let decode_err = |message: String| SinkError::Decode {
            path: path.clone(),
            message,
        };

        let entries: Vec<CountEntry> = match format {
            SinkFormat::Text => {
                let text = String::from_utf8(bytes).map_err(|e| decode_err(e.to_string()))?;
                text.lines()
                    .map(|line| {
                        parse_text_entry(line)
                            .ok_or_else(|| decode_err(format!("malformed line '{line}'")))
                    })
                    .collect::<Result<_, _>>()?
            }
            SinkFormat::Json => {
                let map: BTreeMap<String, u64> =
                    serde_json::from_slice(&bytes).map_err(|e| decode_err(e.to_string()))?;
                map.into_iter()
                    .map(|(token, count)| CountEntry { token, count })
                    .collect()
            }
            SinkFormat::Bincode => {
                bincode::deserialize(&bytes).map_err(|e| decode_err(e.to_string()))?
            }
        };

        GlobalCounts::from_entries(entries).map_err(|e| decode_err(e.to_string()))
    }

    fn encode(&self, counts: &GlobalCounts) -> Result<Vec<u8>, SinkError> {
        let entries = counts.sorted_entries();
        let encode_err = |message: String| SinkError::Encode {
            format: self.format.name(),
            message,
        };

        match self.format {
            SinkFormat::Text => {
                let mut buf = Vec::new();
                for entry in &entries {
                    // tokens never contain whitespace, so a tab is an unambiguous separator
                    writeln!(buf, "{}\t{}", entry.token, entry.count)
                        .map_err(|e| encode_err(e.to_string()))?;
                }
                Ok(buf)
            }
            SinkFormat::Json => {
                let map: BTreeMap<&str, u64> = entries
                    .iter()
                    .map(|entry| (entry.token.as_str(), entry.count))
                    .collect();
                serde_json::to_vec_pretty(&map).map_err(|e| encode_err(e.to_string()))
            }
            SinkFormat::Bincode => {
                bincode::serialize(&entries).map_err(|e| encode_err(e.to_string()))
            }
        }
    }

    /// Remove a previous result directory, refusing anything that is not one.
    fn clear_previous(&self) -> Result<(), SinkError> {
        if !self.dir.exists() {
            return Ok(());
        }
        if !self.dir.is_dir() {
            return Err(SinkError::RefuseOverwrite {
                path: self.dir.clone(),
            });
        }

        let mut has_marker = false;
        let mut only_parts = true;
        for entry in fs::read_dir(&self.dir).map_err(|e| SinkError::io(&self.dir, e))? {
            let entry = entry.map_err(|e| SinkError::io(&self.dir, e))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name == SUCCESS_MARKER {
                has_marker = true;
            } else if !name.starts_with(PART_PREFIX) {
                only_parts = false;
            }
        }

        if !has_marker && !only_parts {
            return Err(SinkError::RefuseOverwrite {
                path: self.dir.clone(),
            });
        }

        fs::remove_dir_all(&self.dir).map_err(|e| SinkError::io(&self.dir, e))
    }
}

fn parse_text_entry(line: &str) -> Option<CountEntry> {
    let (token, count) = line.rsplit_once('\t')?;
    Some(CountEntry {
        token: token.to_string(),
        count: count.parse().ok()?,
    })
}

impl ResultSink for DirectorySink {
    fn write(&mut self, counts: &GlobalCounts) -> Result<(), SinkError> {
        let payload = self.encode(counts)?;

        self.clear_previous()?;
        fs::create_dir_all(&self.dir).map_err(|e| SinkError::io(&self.dir, e))?;

        let part = self.dir.join(self.format.part_file());
        let file = fs::File::create(&part).map_err(|e| SinkError::io(&part, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(&payload)
            .and_then(|_| writer.flush())
            .map_err(|e| SinkError::io(&part, e))?;

        // the marker goes last so a partial directory never looks complete
        let marker = self.dir.join(SUCCESS_MARKER);
        fs::File::create(&marker).map_err(|e| SinkError::io(&marker, e))?;
        Ok(())
    }

    fn location(&self) -> String {
        format!("{} ({})", self.dir.display(), self.format)
    }
}

/// Keeps the last written mapping in memory.
///
/// Clones share the same slot, so a test can keep one handle and give the
/// other to the pipeline.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    written: Arc<Mutex<Option<GlobalCounts>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mapping most recently written, if any.
    pub fn last_written(&self) -> Option<GlobalCounts> {
        self.written
            .lock()
            .map(|slot| slot.clone())
            .unwrap_or_default()
    }
}

impl ResultSink for MemorySink {
    fn write(&mut self, counts: &GlobalCounts) -> Result<(), SinkError> {
        let mut slot = self
            .written
            .lock()
            .map_err(|_| SinkError::Unavailable("memory sink lock poisoned".into()))?;
        *slot = Some(counts.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{aggregate_partition, reduce};

    fn counts() -> GlobalCounts {
        reduce(vec![
            aggregate_partition(0, ["Vision and Robotics"]).unwrap(),
            aggregate_partition(1, ["Robotics enables Predictive maintenance"]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn text_format_is_sorted_tab_separated() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut sink = DirectorySink::new(&out, SinkFormat::Text);
        sink.write(&counts()).unwrap();

        let text = fs::read_to_string(out.join("part-00000")).unwrap();
        assert_eq!(
            text,
            "Predictive\t1\nRobotics\t2\nVision\t1\nand\t1\nenables\t1\nmaintenance\t1\n"
        );
        assert!(out.join(SUCCESS_MARKER).exists());
    }

    #[test]
    fn every_format_loads_back() {
        for format in [SinkFormat::Text, SinkFormat::Json, SinkFormat::Bincode] {
            let dir = tempfile::tempdir().unwrap();
            let out = dir.path().join("out");
            DirectorySink::new(&out, format).write(&counts()).unwrap();

            let loaded = DirectorySink::load(&out, format).unwrap();
            assert_eq!(loaded, counts(), "format {format}");
        }
    }

    #[test]
    fn load_rejects_counts_whose_total_overflows() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("part-00000"),
            format!("a\t{}\nb\t1\n", u64::MAX),
        )
        .unwrap();

        let err = DirectorySink::load(dir.path(), SinkFormat::Text).unwrap_err();
        assert!(matches!(err, SinkError::Decode { .. }));
    }

    #[test]
    fn rewrite_replaces_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut sink = DirectorySink::new(&out, SinkFormat::Text);
        sink.write(&counts()).unwrap();
        let first = fs::read(out.join("part-00000")).unwrap();

        sink.write(&counts()).unwrap();
        let second = fs::read(out.join("part-00000")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn refuses_to_clear_foreign_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.md"), "keep me").unwrap();

        let mut sink = DirectorySink::new(dir.path(), SinkFormat::Text);
        let err = sink.write(&counts()).unwrap_err();

        assert!(matches!(err, SinkError::RefuseOverwrite { .. }));
        assert!(dir.path().join("notes.md").exists());
    }

    #[test]
    fn refuses_to_replace_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("counts.txt");
        fs::write(&file, "x").unwrap();

        let err = DirectorySink::new(&file, SinkFormat::Json)
            .write(&counts())
            .unwrap_err();
        assert!(matches!(err, SinkError::RefuseOverwrite { .. }));
    }

    #[test]
    fn format_parses_from_str() {
        assert_eq!("TEXT".parse::<SinkFormat>().unwrap(), SinkFormat::Text);
        assert_eq!("bin".parse::<SinkFormat>().unwrap(), SinkFormat::Bincode);
        assert!("csv".parse::<SinkFormat>().is_err());
    }

    #[test]
    fn memory_sink_shares_written_counts() {
        let handle = MemorySink::new();
        let mut sink = handle.clone();
        assert!(handle.last_written().is_none());

        sink.write(&counts()).unwrap();
        assert_eq!(handle.last_written(), Some(counts()));
    }
}
