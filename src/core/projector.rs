//! Projection of the global counts onto a list of target tokens.

use super::counts::{Count, GlobalCounts, Token};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Resolved count for one target token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCount {
    pub token: Token,
    pub count: Count,
}

impl TargetCount {
    /// Whether the token occurred in the corpus at all.
    pub fn found(&self) -> bool {
        self.count > 0
    }
}

/// Target counts plus corpus statistics for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetReport {
    /// One row per requested target, in request order
    pub targets: Vec<TargetCount>,
    /// Number of distinct tokens in the corpus
    pub distinct_count: usize,
    /// Number of tokens in the corpus
    pub total_occurrences: Count,
    /// Input records (lines) read from the source
    #[serde(default)]
    pub records: usize,
    /// Wall-clock time spent by the run before reporting
    pub elapsed: Duration,
    pub generated_at: DateTime<Utc>,
    pub run_id: Option<Uuid>,
}

impl TargetReport {
    pub fn with_records(mut self, records: usize) -> Self {
        self.records = records;
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Count reported for `token`, if it was one of the targets.
    pub fn count_for(&self, token: &str) -> Option<Count> {
        self.targets
            .iter()
            .find(|target| target.token == token)
            .map(|target| target.count)
    }
}

/// Resolve every target against `counts`.
///
/// Absent targets report 0; no target is ever dropped.
///
/// ```
/// use wordtally::core::{aggregate_partition, project, reduce};
///
/// let global = reduce(vec![aggregate_partition(0, ["Vision and Robotics"]).unwrap()]).unwrap();
/// let report = project(&global, &["Vision", "Assistants"]);
///
/// assert_eq!(report.count_for("Vision"), Some(1));
/// assert_eq!(report.count_for("Assistants"), Some(0));
/// assert_eq!(report.distinct_count, 3);
/// ```
pub fn project<T: AsRef<str>>(counts: &GlobalCounts, targets: &[T]) -> TargetReport {
    let targets = targets
        .iter()
        .map(|target| {
            let token = target.as_ref();
            TargetCount {
                token: token.to_owned(),
                count: counts.get(token),
            }
        })
        .collect();

    TargetReport {
        targets,
        distinct_count: counts.len(),
        total_occurrences: counts.total(),
        records: 0,
        elapsed: Duration::ZERO,
        generated_at: Utc::now(),
        run_id: None,
    }
}
