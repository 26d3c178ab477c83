//! Property-based tests for the counting core.
//!
//! These tests use proptest to verify the reduction laws hold across
//! many randomly generated corpora and partitionings.

use proptest::prelude::*;
use std::collections::HashMap;
use wordtally::core::{
    aggregate_partition, project, reduce, tokenize, tree_reduce, GlobalCounts, PartialCounts,
};

fn arbitrary_line() -> impl Strategy<Value = String> {
    prop::collection::vec(("[a-dA-D]{1,4}", "[ \t]{1,3}"), 0..8).prop_map(|words| {
        words
            .into_iter()
            .map(|(word, gap)| format!("{word}{gap}"))
            .collect()
    })
}

fn arbitrary_corpus() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arbitrary_line(), 0..24)
}

fn partition(lines: &[String], per_partition: usize) -> Vec<PartialCounts> {
    lines
        .chunks(per_partition)
        .enumerate()
        .map(|(id, chunk)| aggregate_partition(id, chunk.iter().map(String::as_str)).unwrap())
        .collect()
}

fn naive_counts(lines: &[String]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for word in lines.iter().flat_map(|line| line.split_whitespace()) {
        *counts.entry(word.to_string()).or_insert(0) += 1;
    }
    counts
}

fn shuffled_partitions() -> impl Strategy<Value = (Vec<PartialCounts>, Vec<PartialCounts>)> {
    (arbitrary_corpus(), 1..6usize).prop_flat_map(|(lines, size)| {
        let parts = partition(&lines, size);
        (Just(parts.clone()), Just(parts).prop_shuffle())
    })
}

proptest! {
    #[test]
    fn reduce_ignores_partition_order((parts, shuffled) in shuffled_partitions()) {
        prop_assert_eq!(reduce(parts).unwrap(), reduce(shuffled).unwrap());
    }

    #[test]
    fn tree_reduce_matches_fold((parts, shuffled) in shuffled_partitions()) {
        prop_assert_eq!(reduce(parts).unwrap(), tree_reduce(shuffled).unwrap());
    }

    #[test]
    fn partition_size_does_not_change_counts(lines in arbitrary_corpus(), a in 1..6usize, b in 1..6usize) {
        prop_assert_eq!(
            reduce(partition(&lines, a)).unwrap(),
            reduce(partition(&lines, b)).unwrap()
        );
    }

    #[test]
    fn counts_are_conserved(lines in arbitrary_corpus(), size in 1..6usize) {
        let parts = partition(&lines, size);
        let partial_total: u64 = parts.iter().map(PartialCounts::tokens).sum();
        let global = reduce(parts).unwrap();

        let expected = naive_counts(&lines);
        prop_assert_eq!(global.total(), partial_total);
        prop_assert_eq!(global.len(), expected.len());
        for (token, count) in &expected {
            prop_assert_eq!(global.get(token), *count);
        }
    }

    #[test]
    fn retried_partitions_are_counted_once(lines in arbitrary_corpus(), size in 1..6usize) {
        let parts = partition(&lines, size);
        let mut with_retries = parts.clone();
        with_retries.extend(parts.iter().cloned());

        prop_assert_eq!(reduce(with_retries).unwrap(), reduce(parts).unwrap());
    }

    #[test]
    fn projection_lists_every_target(
        lines in arbitrary_corpus(),
        targets in prop::collection::vec("[a-dA-D]{1,4}", 0..8),
    ) {
        let global = reduce(partition(&lines, 3)).unwrap();
        let report = project(&global, &targets);

        prop_assert_eq!(report.targets.len(), targets.len());
        for (row, target) in report.targets.iter().zip(&targets) {
            prop_assert_eq!(&row.token, target);
            prop_assert_eq!(row.count, global.get(target));
        }
        prop_assert_eq!(report.distinct_count, global.len());
        prop_assert_eq!(report.total_occurrences, global.total());
    }

    #[test]
    fn tokens_are_non_empty_and_whitespace_free(line in arbitrary_line()) {
        for token in tokenize(&line) {
            prop_assert!(!token.is_empty());
            prop_assert!(!token.chars().any(char::is_whitespace));
        }
        prop_assert_eq!(tokenize(&line).count(), line.split_whitespace().count());
    }

    #[test]
    fn persisted_entries_rebuild_the_mapping(lines in arbitrary_corpus()) {
        let global = reduce(partition(&lines, 2)).unwrap();
        let rebuilt = GlobalCounts::from_entries(global.sorted_entries()).unwrap();
        prop_assert_eq!(rebuilt, global);
    }
}
