//! The `OutputWriter` trait implemented by backend writers.

use crate::{FinishRow, MealRow, OutputResult, SeatRow};

/// A sink for run logs.
///
/// Seat threads write concurrently, so the observer wraps the writer in a
/// mutex; implementations only need to be `Send`.
pub trait OutputWriter: Send {
    fn write_meal(&mut self, row: &MealRow) -> OutputResult<()>;

    fn write_finish(&mut self, row: &FinishRow) -> OutputResult<()>;

    fn write_seat(&mut self, row: &SeatRow) -> OutputResult<()>;

    /// Flush all underlying file handles.
    ///
    /// Idempotent, safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
