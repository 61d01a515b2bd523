//! Dinner observer trait for narration and data collection.

use std::fmt;
use std::time::Duration;

use dp_table::Seat;

use crate::RunReport;

/// Where a seat is in its loop.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Phase {
    Seated,
    Thinking,
    Acquiring,
    Using,
    Releasing,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Seated    => "seated",
            Phase::Thinking  => "thinking",
            Phase::Acquiring => "acquiring forks",
            Phase::Using     => "eating",
            Phase::Releasing => "releasing forks",
            Phase::Finished  => "finished",
        })
    }
}

/// Callbacks invoked from the seat threads.
///
/// Unlike a single-threaded tick loop, every seat calls in concurrently, so
/// methods take `&self` and implementors need their own interior locking.
/// All methods default to no-ops.
///
/// # Example: meal counter
///
/// ```rust,ignore
/// struct MealCounter(AtomicU64);
///
/// impl DinnerObserver for MealCounter {
///     fn on_meal(&self, _seat: &Seat, _meal: u32, _waited: Duration) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait DinnerObserver: Send + Sync {
    /// A seat moved to `phase`.
    fn on_phase(&self, _seat: &Seat, _phase: Phase) {}

    /// A seat finished meal number `meal` (1-based) after waiting `waited`
    /// for its forks.
    fn on_meal(&self, _seat: &Seat, _meal: u32, _waited: Duration) {}

    /// A seat left the table in 0-based finishing `position`.
    fn on_finished(&self, _seat: &Seat, _position: usize) {}

    /// The run passed every audit.  Not called for failed runs.
    fn on_dinner_end(&self, _report: &RunReport) {}
}

/// A [`DinnerObserver`] that does nothing.
pub struct NoopObserver;

impl DinnerObserver for NoopObserver {}
