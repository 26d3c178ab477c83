//! Global reduction of partition counts.
//!
//! Merging is integer addition per token, which is commutative and
//! associative, so the result does not depend on arrival order or on how
//! merges are grouped. Both entry points first collapse retried partitions so
//! a partition delivered twice is counted once.

use super::counts::{Count, GlobalCounts, PartialCounts, PartitionId, Token};
use super::error::AggregationError;
use rayon::prelude::*;
use std::collections::btree_map::{self, BTreeMap};
use std::collections::hash_map::{self, HashMap};

/// Merge partitions with a sequential fold.
///
/// Zero partitions yield an empty mapping.
///
/// ```
/// use wordtally::core::{aggregate_partition, reduce};
///
/// let parts = vec![
///     aggregate_partition(0, ["Vision and Robotics"]).unwrap(),
///     aggregate_partition(1, ["Robotics enables Predictive maintenance"]).unwrap(),
/// ];
/// let global = reduce(parts).unwrap();
/// assert_eq!(global.get("Robotics"), 2);
/// assert_eq!(global.len(), 6);
/// assert_eq!(global.total(), 7);
/// ```
pub fn reduce<I>(parts: I) -> Result<GlobalCounts, AggregationError>
where
    I: IntoIterator<Item = PartialCounts>,
{
    let parts = collapse_retries(parts)?;
    let absorbed = absorbed_tokens(&parts)?;

    let mut merged = HashMap::new();
    for part in parts.into_values() {
        merge_into(&mut merged, part.into_counts())?;
    }

    check_conservation(GlobalCounts::from_map(merged)?, absorbed)
}

/// Merge partitions pairwise on the current rayon pool.
///
/// Produces exactly the same mapping as [`reduce`].
pub fn tree_reduce<I>(parts: I) -> Result<GlobalCounts, AggregationError>
where
    I: IntoIterator<Item = PartialCounts>,
{
    let parts = collapse_retries(parts)?;
    let absorbed = absorbed_tokens(&parts)?;

    let maps: Vec<HashMap<Token, Count>> = parts
        .into_values()
        .map(PartialCounts::into_counts)
        .collect();
    let merged = maps
        .into_par_iter()
        .map(Ok::<_, AggregationError>)
        .try_reduce(HashMap::new, merge)?;

    check_conservation(GlobalCounts::from_map(merged)?, absorbed)
}

fn collapse_retries<I>(parts: I) -> Result<BTreeMap<PartitionId, PartialCounts>, AggregationError>
where
    I: IntoIterator<Item = PartialCounts>,
{
    let mut by_partition = BTreeMap::new();
    for part in parts {
        match by_partition.entry(part.partition()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(part);
            }
            btree_map::Entry::Occupied(existing) => {
                if existing.get() != &part {
                    return Err(AggregationError::ConflictingRetry {
                        partition: part.partition(),
                    });
                }
            }
        }
    }
    Ok(by_partition)
}

fn absorbed_tokens(parts: &BTreeMap<PartitionId, PartialCounts>) -> Result<Count, AggregationError> {
    parts
        .values()
        .try_fold(0, |total: Count, part| total.checked_add(part.tokens()))
        .ok_or(AggregationError::TotalOverflow)
}

fn merge(
    mut left: HashMap<Token, Count>,
    mut right: HashMap<Token, Count>,
) -> Result<HashMap<Token, Count>, AggregationError> {
    // fold the smaller map into the larger one
    if left.len() < right.len() {
        std::mem::swap(&mut left, &mut right);
    }
    merge_into(&mut left, right)?;
    Ok(left)
}

fn merge_into(
    acc: &mut HashMap<Token, Count>,
    other: HashMap<Token, Count>,
) -> Result<(), AggregationError> {
    for (token, count) in other {
        match acc.entry(token) {
            hash_map::Entry::Occupied(mut slot) => {
                let sum = slot.get().checked_add(count).ok_or_else(|| {
                    AggregationError::CountOverflow {
                        token: slot.key().clone(),
                    }
                })?;
                *slot.get_mut() = sum;
            }
            hash_map::Entry::Vacant(slot) => {
                slot.insert(count);
            }
        }
    }
    Ok(())
}

fn check_conservation(
    global: GlobalCounts,
    absorbed: Count,
) -> Result<GlobalCounts, AggregationError> {
    let counted = global.total();
    if counted != absorbed {
        return Err(AggregationError::ConservationViolated { counted, absorbed });
    }
    Ok(global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::aggregate_partition;

    fn parts() -> Vec<PartialCounts> {
        vec![
            aggregate_partition(0, ["a b c", "a"]).unwrap(),
            aggregate_partition(1, ["b b d"]).unwrap(),
            aggregate_partition(2, ["c a e"]).unwrap(),
        ]
    }

    #[test]
    fn sums_counts_across_partitions() {
        let global = reduce(parts()).unwrap();

        assert_eq!(global.get("a"), 3);
        assert_eq!(global.get("b"), 3);
        assert_eq!(global.get("c"), 2);
        assert_eq!(global.get("d"), 1);
        assert_eq!(global.get("e"), 1);
        assert_eq!(global.total(), 10);
    }

    #[test]
    fn zero_partitions_yield_empty_counts() {
        let global = reduce(Vec::new()).unwrap();
        assert!(global.is_empty());

        let tree = tree_reduce(Vec::new()).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn tree_reduce_matches_fold() {
        assert_eq!(tree_reduce(parts()).unwrap(), reduce(parts()).unwrap());
    }

    #[test]
    fn reversed_arrival_order_gives_same_result() {
        let mut reversed = parts();
        reversed.reverse();
        assert_eq!(reduce(reversed).unwrap(), reduce(parts()).unwrap());
    }

    #[test]
    fn identical_retry_is_counted_once() {
        let mut with_retry = parts();
        with_retry.push(aggregate_partition(1, ["b b d"]).unwrap());

        assert_eq!(reduce(with_retry).unwrap(), reduce(parts()).unwrap());
    }

    #[test]
    fn divergent_retry_is_rejected() {
        let mut with_retry = parts();
        with_retry.push(aggregate_partition(1, ["b d"]).unwrap());

        let err = reduce(with_retry).unwrap_err();
        assert_eq!(err, AggregationError::ConflictingRetry { partition: 1 });
    }

    #[test]
    fn overflow_is_reported() {
        let mut left = HashMap::new();
        left.insert("x".to_string(), Count::MAX);
        let mut right = HashMap::new();
        right.insert("x".to_string(), 1);

        let err = merge(left, right).unwrap_err();
        assert_eq!(
            err,
            AggregationError::CountOverflow {
                token: "x".to_string()
            }
        );
    }

    #[test]
    fn total_overflow_across_partitions_is_reported() {
        let single = |partition, token: &str, count| {
            let mut counts = HashMap::new();
            counts.insert(token.to_string(), count);
            PartialCounts::from_counts(partition, counts).unwrap()
        };
        let parts = || vec![single(0, "a", Count::MAX), single(1, "b", 1)];

        assert_eq!(reduce(parts()).unwrap_err(), AggregationError::TotalOverflow);
        assert_eq!(tree_reduce(parts()).unwrap_err(), AggregationError::TotalOverflow);
    }

    #[test]
    fn inconsistent_token_total_is_rejected() {
        let mut counts = HashMap::new();
        counts.insert("x".to_string(), 2);
        let broken = PartialCounts::from_parts(0, counts, 5);

        let err = reduce(vec![broken]).unwrap_err();
        assert_eq!(
            err,
            AggregationError::ConservationViolated {
                counted: 2,
                absorbed: 5
            }
        );
    }
}
