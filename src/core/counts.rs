//! Records and count mappings.

use super::error::AggregationError;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::{self, HashMap};

/// A normalized word. Compared by exact string equality.
pub type Token = String;

/// Borrowed view of a token.
pub type TokenRef = str;

/// Occurrence count of a token.
pub type Count = u64;

/// Index of a partition within one pipeline run.
pub type PartitionId = usize;

/// One line of input text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    line: usize,
    text: String,
}

impl Record {
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }

    /// Zero-based line number within the source.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A `(token, count)` pair as it is persisted.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CountEntry {
    pub token: Token,
    pub count: Count,
}

/// Token counts for a single partition, produced by the partition aggregator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialCounts {
    partition: PartitionId,
    counts: HashMap<Token, Count>,
    tokens: Count,
}

impl PartialCounts {
    pub(crate) fn from_parts(
        partition: PartitionId,
        counts: HashMap<Token, Count>,
        tokens: Count,
    ) -> Self {
        Self {
            partition,
            counts,
            tokens,
        }
    }

    /// Build partition counts directly from a mapping.
    ///
    /// The token total is derived from the mapping, so the result always
    /// satisfies the conservation check. Fails if that total does not fit in
    /// a [`Count`].
    pub fn from_counts(
        partition: PartitionId,
        counts: HashMap<Token, Count>,
    ) -> Result<Self, AggregationError> {
        let tokens = checked_total(&counts)?;
        Ok(Self {
            partition,
            counts,
            tokens,
        })
    }

    pub fn partition(&self) -> PartitionId {
        self.partition
    }

    /// Number of tokens this partition absorbed.
    pub fn tokens(&self) -> Count {
        self.tokens
    }

    /// Number of distinct tokens in this partition.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn get(&self, token: &TokenRef) -> Count {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub(crate) fn into_counts(self) -> HashMap<Token, Count> {
        self.counts
    }
}

/// Token counts for the whole corpus.
///
/// Only the reducer constructs a `GlobalCounts` from partition results, so a
/// value of this type is always complete. It is read-only afterwards, and its
/// total always fits in a [`Count`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlobalCounts {
    counts: HashMap<Token, Count>,
    total: Count,
}

impl GlobalCounts {
    pub(crate) fn from_map(counts: HashMap<Token, Count>) -> Result<Self, AggregationError> {
        let total = checked_total(&counts)?;
        Ok(Self { counts, total })
    }

    /// Rebuild a mapping from persisted entries. Repeated tokens are summed.
    pub fn from_entries<I>(entries: I) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = CountEntry>,
    {
        let mut counts: HashMap<Token, Count> = HashMap::new();
        for entry in entries {
            match counts.entry(entry.token) {
                hash_map::Entry::Occupied(mut slot) => {
                    let sum = slot.get().checked_add(entry.count).ok_or_else(|| {
                        AggregationError::CountOverflow {
                            token: slot.key().clone(),
                        }
                    })?;
                    *slot.get_mut() = sum;
                }
                hash_map::Entry::Vacant(slot) => {
                    slot.insert(entry.count);
                }
            }
        }
        Self::from_map(counts)
    }

    /// Count for `token`, or 0 when the corpus never contained it.
    pub fn get(&self, token: &TokenRef) -> Count {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub fn contains(&self, token: &TokenRef) -> bool {
        self.counts.contains_key(token)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, i.e. the number of tokens in the corpus.
    pub fn total(&self) -> Count {
        self.total
    }

    pub fn iter(&self) -> hash_map::Iter<'_, Token, Count> {
        self.counts.iter()
    }

    /// Entries ordered by token bytes, for deterministic output.
    pub fn sorted_entries(&self) -> Vec<CountEntry> {
        let mut entries: Vec<CountEntry> = self
            .counts
            .iter()
            .map(|(token, &count)| CountEntry {
                token: token.clone(),
                count,
            })
            .collect();
        entries.sort();
        entries
    }
}

/// Sum of all counts in `counts`, or `TotalOverflow` if it exceeds [`Count`].
pub(crate) fn checked_total(counts: &HashMap<Token, Count>) -> Result<Count, AggregationError> {
    counts
        .values()
        .try_fold(0, |total: Count, &count| total.checked_add(count))
        .ok_or(AggregationError::TotalOverflow)
}

impl<'a> IntoIterator for &'a GlobalCounts {
    type Item = (&'a Token, &'a Count);
    type IntoIter = hash_map::Iter<'a, Token, Count>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}
