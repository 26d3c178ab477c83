//! Invariant violations raised by the counting core.

use super::counts::PartitionId;
use thiserror::Error;

/// An internal invariant of the aggregation was violated.
///
/// These indicate a bug (or an absurdly large corpus, for overflow) and are
/// never masked by the driver.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("partition {partition} produced an empty token")]
    EmptyToken { partition: PartitionId },

    #[error("count for token '{token}' overflowed")]
    CountOverflow { token: String },

    #[error("total number of tokens overflowed")]
    TotalOverflow,

    #[error("partition {partition} was delivered twice with different counts")]
    ConflictingRetry { partition: PartitionId },

    #[error("counted {counted} occurrences but partitions absorbed {absorbed} tokens")]
    ConservationViolated { counted: u64, absorbed: u64 },
}
