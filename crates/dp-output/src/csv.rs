//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `meals.csv`
//! - `finishes.csv`
//! - `seats.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{FinishRow, MealRow, OutputResult, SeatRow};

/// Writes run logs to three CSV files.
pub struct CsvWriter {
    meals:    Writer<File>,
    finishes: Writer<File>,
    seats:    Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create the three CSV files in `dir` (which must exist) and write the
    /// header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut meals = Writer::from_path(dir.join("meals.csv"))?;
        meals.write_record(["agent", "name", "meal", "waited_us"])?;

        let mut finishes = Writer::from_path(dir.join("finishes.csv"))?;
        finishes.write_record(["position", "agent", "name"])?;

        let mut seats = Writer::from_path(dir.join("seats.csv"))?;
        seats.write_record(["agent", "name", "meals", "total_wait_us", "longest_wait_us"])?;

        Ok(Self { meals, finishes, seats, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_meal(&mut self, row: &MealRow) -> OutputResult<()> {
        self.meals.write_record(&[
            row.agent.to_string(),
            row.name.clone(),
            row.meal.to_string(),
            row.waited_us.to_string(),
        ])?;
        Ok(())
    }

    fn write_finish(&mut self, row: &FinishRow) -> OutputResult<()> {
        self.finishes.write_record(&[row.position.to_string(), row.agent.to_string(), row.name.clone()])?;
        Ok(())
    }

    fn write_seat(&mut self, row: &SeatRow) -> OutputResult<()> {
        self.seats.write_record(&[
            row.agent.to_string(),
            row.name.clone(),
            row.meals.to_string(),
            row.total_wait_us.to_string(),
            row.longest_wait_us.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.meals.flush()?;
        self.finishes.flush()?;
        self.seats.flush()?;
        Ok(())
    }
}
