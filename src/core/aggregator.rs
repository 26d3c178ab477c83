//! Partition-local aggregation (the combiner step).

use super::counts::{Count, PartialCounts, PartitionId, Token, TokenRef};
use super::error::AggregationError;
use super::tokenizer::tokenize;
use std::collections::HashMap;

/// Running token counter for one partition.
///
/// Memory grows with the number of distinct tokens, not the number of tokens
/// pushed. An aggregator is never shared between partitions.
///
/// ```
/// use wordtally::core::PartitionAggregator;
///
/// let mut aggregator = PartitionAggregator::new(0);
/// aggregator.absorb_record("Vision and Robotics").unwrap();
/// aggregator.absorb_record("Robotics enables Predictive maintenance").unwrap();
///
/// let partial = aggregator.finish();
/// assert_eq!(partial.get("Robotics"), 2);
/// assert_eq!(partial.tokens(), 7);
/// ```
#[derive(Debug)]
pub struct PartitionAggregator {
    partition: PartitionId,
    counts: HashMap<Token, Count>,
    tokens: Count,
}

impl PartitionAggregator {
    pub fn new(partition: PartitionId) -> Self {
        Self {
            partition,
            counts: HashMap::new(),
            tokens: 0,
        }
    }

    pub fn partition(&self) -> PartitionId {
        self.partition
    }

    /// Count one occurrence of `token`.
    pub fn push(&mut self, token: &TokenRef) -> Result<(), AggregationError> {
        if token.is_empty() {
            return Err(AggregationError::EmptyToken {
                partition: self.partition,
            });
        }

        // Avoid allocating a key for tokens already seen
        if let Some(slot) = self.counts.get_mut(token) {
            *slot = slot
                .checked_add(1)
                .ok_or_else(|| AggregationError::CountOverflow {
                    token: token.to_owned(),
                })?;
        } else {
            self.counts.insert(token.to_owned(), 1);
        }
        self.tokens = self
            .tokens
            .checked_add(1)
            .ok_or(AggregationError::TotalOverflow)?;
        Ok(())
    }

    /// Tokenize a record and count every token in it.
    pub fn absorb_record(&mut self, record: &str) -> Result<(), AggregationError> {
        for token in tokenize(record) {
            self.push(token)?;
        }
        Ok(())
    }

    /// Number of distinct tokens seen so far.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Emit the partition's counts once its input is exhausted.
    pub fn finish(self) -> PartialCounts {
        PartialCounts::from_parts(self.partition, self.counts, self.tokens)
    }
}

/// Aggregate a whole partition of records in one call.
pub fn aggregate_partition<'a, I>(
    partition: PartitionId,
    records: I,
) -> Result<PartialCounts, AggregationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut aggregator = PartitionAggregator::new(partition);
    for record in records {
        aggregator.absorb_record(record)?;
    }
    Ok(aggregator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_repeated_tokens() {
        let partial = aggregate_partition(0, ["a b a", "b a"]).unwrap();

        assert_eq!(partial.get("a"), 3);
        assert_eq!(partial.get("b"), 2);
        assert_eq!(partial.len(), 2);
        assert_eq!(partial.tokens(), 5);
    }

    #[test]
    fn result_is_independent_of_token_order() {
        let forward = aggregate_partition(1, ["x y z x"]).unwrap();
        let backward = aggregate_partition(1, ["x z y x"]).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn empty_partition_yields_empty_counts() {
        let partial = aggregate_partition(4, Vec::<&str>::new()).unwrap();
        assert!(partial.is_empty());
        assert_eq!(partial.tokens(), 0);
        assert_eq!(partial.partition(), 4);
    }

    #[test]
    fn empty_token_is_rejected() {
        let mut aggregator = PartitionAggregator::new(2);
        let err = aggregator.push("").unwrap_err();
        assert_eq!(err, AggregationError::EmptyToken { partition: 2 });
    }

    #[test]
    fn distinct_tracks_unique_tokens() {
        let mut aggregator = PartitionAggregator::new(0);
        aggregator.absorb_record("one two one two one").unwrap();
        assert_eq!(aggregator.distinct(), 2);
    }
}
