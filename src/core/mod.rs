//! Pure counting core.
//!
//! Everything in this module is free of I/O:
//! - tokenizing records
//! - partition-local aggregation
//! - the order-independent global reduction
//! - projection onto target tokens
//! - the phase/history primitives the driver builds its lifecycle on

mod aggregator;
mod counts;
mod error;
mod history;
pub mod macros;
mod projector;
mod reducer;
mod state;
mod tokenizer;

pub use aggregator::{aggregate_partition, PartitionAggregator};
pub use counts::{
    Count, CountEntry, GlobalCounts, PartialCounts, PartitionId, Record, Token, TokenRef,
};
pub use error::AggregationError;
pub use history::{StateHistory, StateTransition};
pub use projector::{project, TargetCount, TargetReport};
pub use reducer::{reduce, tree_reduce};
pub use state::State;
pub use tokenizer::{tokenize, Tokens};
