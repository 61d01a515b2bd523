//! Resource hierarchy: every seat takes its lower-numbered fork first.
//!
//! The pair is sorted once when the seat is built (`Seat::low`/`Seat::high`),
//! so all seats agree on one global total order over forks and a wait cycle
//! cannot form.  Seats whose low fork is contended by a lower-numbered
//! neighbour tend to lose races; high-numbered seats can starve under
//! adversarial scheduling.  That is a known property of the scheme, not
//! something this implementation tries to correct.

use std::sync::Arc;

use dp_core::StrategyKind;
use dp_table::{ForkSet, Seat};
use tracing::debug;

use crate::strategy::{acquire_in_order, release_pair};
use crate::{AllocationStrategy, StrategyResult};

pub struct Hierarchy {
    forks: Arc<ForkSet>,
}

impl Hierarchy {
    pub fn new(forks: Arc<ForkSet>) -> Self {
        Self { forks }
    }
}

impl AllocationStrategy for Hierarchy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Hierarchy
    }

    fn acquire_both(&self, seat: &Seat) -> StrategyResult<()> {
        debug!(%seat, low = %seat.low, high = %seat.high, "reaching for forks in order");
        acquire_in_order(&self.forks, seat.id, seat.low, seat.high)
    }

    fn release_both(&self, seat: &Seat) -> StrategyResult<()> {
        // Reverse order of acquisition.
        release_pair(&self.forks, seat.id, [seat.high, seat.low])
    }
}
