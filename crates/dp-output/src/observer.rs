//! `DinnerOutputObserver<W>`: bridges `DinnerObserver` to an `OutputWriter`.

use std::sync::Mutex;
use std::time::Duration;

use dp_sim::{DinnerObserver, RunReport};
use dp_table::Seat;
use tracing::warn;

use crate::row::{FinishRow, MealRow, SeatRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`DinnerObserver`] that logs every meal and finish to any
/// [`OutputWriter`].
///
/// Errors from the writer are stored because observer callbacks have no
/// return value.  After the run returns, check with
/// [`take_error`][Self::take_error].
pub struct DinnerOutputObserver<W: OutputWriter> {
    writer:     Mutex<W>,
    last_error: Mutex<Option<OutputError>>,
}

fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

impl<W: OutputWriter> DinnerOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(writer), last_error: Mutex::new(None) }
    }

    /// Take the stored write error (if any) after the run returns.
    pub fn take_error(&self) -> Option<OutputError> {
        match self.last_error.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => Some(OutputError::Poisoned),
        }
    }

    /// Flush the writer.  A clean run flushes on its own; call this after a
    /// failed run to keep what was logged.
    pub fn finish(&self) -> OutputResult<()> {
        self.writer.lock().map_err(|_| OutputError::Poisoned)?.finish()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> OutputResult<W> {
        self.writer.into_inner().map_err(|_| OutputError::Poisoned)
    }

    fn with_writer(&self, write: impl FnOnce(&mut W) -> OutputResult<()>) {
        let result = self
            .writer
            .lock()
            .map_err(|_| OutputError::Poisoned)
            .and_then(|mut writer| write(&mut *writer));
        if let Err(e) = result {
            warn!(error = %e, "run log write failed");
            // Keep only the first error.
            if let Ok(mut slot) = self.last_error.lock() {
                slot.get_or_insert(e);
            }
        }
    }
}

impl<W: OutputWriter> DinnerObserver for DinnerOutputObserver<W> {
    fn on_meal(&self, seat: &Seat, meal: u32, waited: Duration) {
        let row = MealRow { agent: seat.id.0, name: seat.name.clone(), meal, waited_us: micros(waited) };
        self.with_writer(|w| w.write_meal(&row));
    }

    fn on_finished(&self, seat: &Seat, position: usize) {
        let row = FinishRow { position, agent: seat.id.0, name: seat.name.clone() };
        self.with_writer(|w| w.write_finish(&row));
    }

    fn on_dinner_end(&self, report: &RunReport) {
        self.with_writer(|w| {
            for summary in &report.summaries {
                w.write_seat(&SeatRow {
                    agent:           summary.agent.0,
                    name:            summary.name.clone(),
                    meals:           summary.meals,
                    total_wait_us:   micros(summary.total_wait),
                    longest_wait_us: micros(summary.longest_wait),
                })?;
            }
            w.finish()
        });
    }
}
