//! `dp-sim`: dinner driver for the dining-philosophers harness.
//!
//! # Seat loop
//!
//! ```text
//! one OS thread per seat:
//!   ① Seated    : wait on the start line until every seat has arrived.
//!   ② repeat `hunger` times:
//!        Thinking  : sleep think (+ jitter); no forks held.
//!        Acquiring : AllocationStrategy::acquire_both via `dine`.
//!        Using     : exclusion monitor entered; sleep eat (+ jitter).
//!        Releasing : HeldForks::release.
//!   ③ Finished  : append own id to the ResultRecorder, exactly once.
//! ```
//!
//! After joining every seat the driver audits the run: the recorder holds N
//! distinct ids, every fork is free with `acquired == released`, and the
//! exclusion monitor saw no overlap.  Any failure is a [`SimError`].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dp_core::{DinnerConfig, StrategyKind};
//! use dp_sim::DinnerBuilder;
//!
//! let dinner = DinnerBuilder::new(DinnerConfig::new(5, StrategyKind::Arbiter)).build()?;
//! let report = dinner.run_with_timeout(Duration::from_secs(5))?;
//! println!("{:?}", report.completion_order());
//! ```

pub mod builder;
pub mod dinner;
pub mod error;
pub mod monitor;
pub mod observer;
pub mod recorder;
pub mod report;
mod start;

#[cfg(test)]
mod tests;

pub use builder::{DinnerBuilder, StrategyFactory};
pub use dinner::{Dinner, run, run_dinner, run_with_timeout};
pub use error::{SimError, SimResult};
pub use monitor::{ExclusionMonitor, ExclusionViolation};
pub use observer::{DinnerObserver, NoopObserver, Phase};
pub use recorder::ResultRecorder;
pub use report::{RunReport, SeatSummary};
