//! Splitting records into partitions and aggregating them in parallel.

use super::error::PipelineError;
use crate::core::{AggregationError, PartialCounts, PartitionAggregator, PartitionId, Record};
use crate::io::{Records, SourceError};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// An independently processable slice of the input.
#[derive(Clone, Debug)]
pub struct Partition {
    id: PartitionId,
    records: Vec<Record>,
}

impl Partition {
    pub fn new(id: PartitionId, records: Vec<Record>) -> Self {
        Self { id, records }
    }

    pub fn id(&self) -> PartitionId {
        self.id
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

/// Lazily cuts a record stream into partitions.
///
/// Only the partition being filled is buffered; records are pulled from the
/// source as partitions are requested. A read error ends the stream.
pub struct Partitions {
    records: Records,
    location: String,
    per_partition: usize,
    next_id: PartitionId,
    line: usize,
    finished: bool,
}

impl Iterator for Partitions {
    type Item = Result<Partition, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut records = Vec::new();
        while records.len() < self.per_partition {
            match self.records.next() {
                Some(Ok(record)) => {
                    records.push(record);
                    self.line += 1;
                }
                Some(Err(source)) => {
                    self.finished = true;
                    return Some(Err(SourceError::Read {
                        location: self.location.clone(),
                        line: self.line,
                        source,
                    }));
                }
                None => {
                    self.finished = true;
                    break;
                }
            }
        }

        if records.is_empty() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        Some(Ok(Partition::new(id, records)))
    }
}

/// Cut `records` into partitions of at most `per_partition` records.
///
/// An empty source yields no partitions.
pub fn partition_records(records: Records, location: &str, per_partition: usize) -> Partitions {
    Partitions {
        records,
        location: location.to_string(),
        per_partition: per_partition.max(1),
        next_id: 0,
        line: 0,
        finished: false,
    }
}

/// Partial counts of every partition plus the number of records they held.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub parts: Vec<PartialCounts>,
    pub records: usize,
}

/// First failure among concurrently running partitions.
#[derive(Default)]
struct Cancellation {
    cancelled: AtomicBool,
    cause: Mutex<Option<PipelineError>>,
}

impl Cancellation {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn cancel(&self, error: PipelineError) {
        self.cause
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(error);
        self.cancelled.store(true, Ordering::Release);
    }

    fn take_cause(&self) -> Option<PipelineError> {
        self.cause
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

enum Interrupted {
    Failed(PartitionId),
    Cancelled(PartitionId),
}

/// Tokenize and count every partition on the current rayon pool.
///
/// Partitions are pulled from `partitions` as workers become free, so the
/// corpus is never held in memory as a whole. The first failure, whether a
/// read error or a failing partition, cancels the remaining partitions at
/// their next record boundary; that error, not the cancellation, is
/// returned. No partial result is ever returned alongside an error.
pub fn aggregate_partitions<I>(partitions: I) -> Result<Aggregation, PipelineError>
where
    I: Iterator<Item = Result<Partition, SourceError>> + Send,
{
    aggregate_with(partitions, |aggregator, record| {
        aggregator.absorb_record(record.text())
    })
}

fn aggregate_with<I, F>(partitions: I, absorb: F) -> Result<Aggregation, PipelineError>
where
    I: Iterator<Item = Result<Partition, SourceError>> + Send,
    F: Fn(&mut PartitionAggregator, &Record) -> Result<(), AggregationError> + Sync,
{
    let cancellation = Cancellation::default();

    let results: Result<Vec<(PartialCounts, usize)>, Interrupted> = partitions
        .map_while(|partition| match partition {
            Ok(partition) if !cancellation.is_cancelled() => Some(partition),
            Ok(_) => None,
            Err(error) => {
                cancellation.cancel(PipelineError::SourceUnavailable(error));
                None
            }
        })
        .fuse()
        .par_bridge()
        .map(|partition| {
            aggregate_one(&partition, &cancellation, &absorb)
                .map(|part| (part, partition.records().len()))
        })
        .collect();

    // a read error can end the stream without failing any partition
    if let Some(cause) = cancellation.take_cause() {
        return Err(cause);
    }

    match results {
        Ok(results) => {
            let records = results.iter().map(|(_, records)| records).sum();
            let parts = results.into_iter().map(|(part, _)| part).collect();
            Ok(Aggregation { parts, records })
        }
        Err(Interrupted::Failed(partition) | Interrupted::Cancelled(partition)) => {
            Err(PipelineError::Cancelled { partition })
        }
    }
}

fn aggregate_one<F>(
    partition: &Partition,
    cancellation: &Cancellation,
    absorb: &F,
) -> Result<PartialCounts, Interrupted>
where
    F: Fn(&mut PartitionAggregator, &Record) -> Result<(), AggregationError>,
{
    let mut aggregator = PartitionAggregator::new(partition.id());

    for record in partition.records() {
        if cancellation.is_cancelled() {
            debug!(partition = partition.id(), "partition cancelled");
            return Err(Interrupted::Cancelled(partition.id()));
        }
        if let Err(error) = absorb(&mut aggregator, record) {
            cancellation.cancel(error.into());
            return Err(Interrupted::Failed(partition.id()));
        }
    }

    let partial = aggregator.finish();
    debug!(
        partition = partial.partition(),
        records = partition.records().len(),
        distinct = partial.len(),
        tokens = partial.tokens(),
        "partition aggregated"
    );
    Ok(partial)
}
