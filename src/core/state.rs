//! The `State` trait shared by every lifecycle phase type.
//!
//! A phase is a plain value; inspecting it never has side effects.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for lifecycle states.
///
/// States must be cloneable and comparable so the history can record them,
/// and serializable so a run record can persist the path a run took.
///
/// # Example
///
/// ```rust
/// use wordtally::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum JobState {
///     Queued,
///     Counting,
///     Done,
///     Aborted,
/// }
///
/// impl State for JobState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Queued => "Queued",
///             Self::Counting => "Counting",
///             Self::Done => "Done",
///             Self::Aborted => "Aborted",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Done)
///     }
///
///     fn is_error(&self) -> bool {
///         matches!(self, Self::Aborted)
///     }
/// }
///
/// assert!(JobState::Done.is_final());
/// assert!(JobState::Aborted.is_error());
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Whether no further transition may leave this state.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Whether this state represents a failure.
    ///
    /// Error states are not necessarily final; a failed run still has to
    /// release its resources before it closes.
    fn is_error(&self) -> bool {
        false
    }
}
