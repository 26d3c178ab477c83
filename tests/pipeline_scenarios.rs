//! End-to-end runs over real files.

use std::fs;
use std::path::Path;
use wordtally::io::{DirectorySink, FileSource, SinkFormat, SUCCESS_MARKER};
use wordtally::pipeline::{Pipeline, PipelineError, PipelinePhase};

fn write_corpus(dir: &Path, lines: &[&str]) -> String {
    let path = dir.join("corpus.txt");
    let mut content = lines.join("\n");
    if !lines.is_empty() {
        content.push('\n');
    }
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

fn file_pipeline(location: &str, output: Option<&Path>, format: SinkFormat) -> Pipeline {
    let mut builder = Pipeline::builder()
        .source(FileSource)
        .location(location)
        .records_per_partition(1)
        .workers(2);
    if let Some(output) = output {
        builder = builder.sink(DirectorySink::new(output, format));
    }
    builder.build().unwrap()
}

fn part_file_bytes(output: &Path) -> Vec<u8> {
    let part = fs::read_dir(output)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .find(|path| !path.ends_with(SUCCESS_MARKER))
        .unwrap();
    fs::read(part).unwrap()
}

#[test]
fn two_line_corpus_reports_standard_targets() {
    let dir = tempfile::tempdir().unwrap();
    let location = write_corpus(
        dir.path(),
        &["Vision and Robotics", "Robotics enables Predictive maintenance"],
    );

    let summary = file_pipeline(&location, None, SinkFormat::Text).run().unwrap();

    let rows: Vec<(&str, u64)> = summary
        .report
        .targets
        .iter()
        .map(|t| (t.token.as_str(), t.count))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Recognition", 0),
            ("Vision", 1),
            ("Robotics", 2),
            ("Assistants", 0),
            ("Predictive", 1),
        ]
    );
    assert_eq!(summary.report.distinct_count, 6);
    assert_eq!(summary.report.total_occurrences, 7);
    assert_eq!(summary.partitions, 2);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.report.records, 2);
}

#[test]
fn empty_corpus_reports_zeroes_without_failing() {
    let dir = tempfile::tempdir().unwrap();
    let location = write_corpus(dir.path(), &[]);

    let summary = file_pipeline(&location, None, SinkFormat::Text).run().unwrap();

    assert!(summary.counts.is_empty());
    assert!(summary.report.targets.iter().all(|t| t.count == 0));
    assert_eq!(summary.report.distinct_count, 0);
    assert_eq!(summary.report.total_occurrences, 0);
    assert_eq!(summary.partitions, 0);
}

#[test]
fn invalid_location_fails_and_releases_context() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("nope.txt").display().to_string();

    let failure = file_pipeline(&location, None, SinkFormat::Text)
        .run()
        .unwrap_err();

    assert!(matches!(failure.error, PipelineError::SourceUnavailable(_)));
    assert_eq!(failure.phase, PipelinePhase::SourceOpened);
    assert_eq!(failure.context_releases, 1);
    assert!(failure.history.visited(&PipelinePhase::Failed));
    assert_eq!(
        failure.history.last_state(),
        Some(&PipelinePhase::Closed)
    );
}

#[test]
fn directory_location_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().display().to_string();

    let failure = file_pipeline(&location, None, SinkFormat::Text)
        .run()
        .unwrap_err();
    assert!(matches!(failure.error, PipelineError::SourceUnavailable(_)));
}

#[test]
fn file_url_prefix_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let location = format!("file://{}", write_corpus(dir.path(), &["Vision Vision"]));

    let summary = file_pipeline(&location, None, SinkFormat::Text).run().unwrap();
    assert_eq!(summary.report.count_for("Vision"), Some(2));
}

#[test]
fn rerun_persists_identical_results() {
    for format in [SinkFormat::Text, SinkFormat::Json, SinkFormat::Bincode] {
        let dir = tempfile::tempdir().unwrap();
        let location = write_corpus(
            dir.path(),
            &["Vision and Robotics", "Robotics enables Predictive maintenance"],
        );
        let output = dir.path().join("counts");

        let first = file_pipeline(&location, Some(&output), format).run().unwrap();
        let first_bytes = part_file_bytes(&output);
        let first_loaded = DirectorySink::load(&output, format).unwrap();

        let second = file_pipeline(&location, Some(&output), format).run().unwrap();
        let second_loaded = DirectorySink::load(&output, format).unwrap();
        let second_bytes = part_file_bytes(&output);

        assert_eq!(first_loaded, first.counts, "{format}");
        assert_eq!(first_loaded, second_loaded, "{format}");
        assert_eq!(first_bytes, second_bytes, "{format}");
        assert_eq!(first.counts, second.counts, "{format}");
        assert!(output.join(SUCCESS_MARKER).exists());
    }
}

#[test]
fn sink_failure_is_explicit_and_degraded() {
    let dir = tempfile::tempdir().unwrap();
    let location = write_corpus(dir.path(), &["Robotics Vision Robotics"]);
    let output = dir.path().join("precious");
    fs::create_dir(&output).unwrap();
    fs::write(output.join("notes.md"), "keep me").unwrap();

    let failure = file_pipeline(&location, Some(&output), SinkFormat::Text)
        .run()
        .unwrap_err();

    assert_eq!(failure.phase, PipelinePhase::Persisted);
    assert!(matches!(failure.error, PipelineError::SinkWriteError { .. }));
    let degraded = failure.degraded_report.as_deref().unwrap();
    assert_eq!(degraded.count_for("Robotics"), Some(2));
    assert_eq!(degraded.total_occurrences, 3);
    assert_eq!(failure.context_releases, 1);
    assert!(!failure.history.visited(&PipelinePhase::Reported));
    assert_eq!(
        fs::read_to_string(output.join("notes.md")).unwrap(),
        "keep me"
    );
}

#[test]
fn context_is_released_once_per_run() {
    let dir = tempfile::tempdir().unwrap();
    let location = write_corpus(dir.path(), &["a b", "c"]);
    let mut pipeline = file_pipeline(&location, None, SinkFormat::Text);

    for _ in 0..3 {
        let summary = pipeline.run().unwrap();
        assert_eq!(summary.context_releases, 1);
    }

    let missing = dir.path().join("gone.txt").display().to_string();
    let failure = file_pipeline(&missing, None, SinkFormat::Text)
        .run()
        .unwrap_err();
    assert_eq!(failure.context_releases, 1);
}
