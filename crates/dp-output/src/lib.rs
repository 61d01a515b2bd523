//! `dp-output`: run logs for the dining-philosophers harness.
//!
//! | File           | One row per                   | Columns                                                      |
//! |----------------|-------------------------------|--------------------------------------------------------------|
//! | `meals.csv`    | meal eaten                    | `agent`, `name`, `meal`, `waited_us`                         |
//! | `finishes.csv` | philosopher leaving the table | `position`, `agent`, `name`                                  |
//! | `seats.csv`    | seat, after a clean run       | `agent`, `name`, `meals`, `total_wait_us`, `longest_wait_us` |
//!
//! Writers implement [`OutputWriter`] and are driven by
//! [`DinnerOutputObserver`], which implements `dp_sim::DinnerObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use dp_output::{CsvWriter, DinnerOutputObserver};
//!
//! let observer = Arc::new(DinnerOutputObserver::new(CsvWriter::new(Path::new("./output"))?));
//! let dinner = DinnerBuilder::new(config).observer(observer.clone()).build()?;
//! dinner.run()?;
//! if let Some(e) = observer.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::DinnerOutputObserver;
pub use row::{FinishRow, MealRow, SeatRow};
pub use writer::OutputWriter;
