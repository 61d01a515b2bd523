//! Asymmetric ordering.
//!
//! Every seat compares its two fork ids at acquire time.  If `left > right`
//! it reaches for the right (lower-numbered) fork first; otherwise left
//! first.  In the standard ring only the seat where the numbering wraps
//! (`left = N-1`, `right = 0`) reaches right-first, which is enough to make
//! a full cycle of "holding left, waiting for right" impossible.

use std::sync::Arc;

use dp_core::StrategyKind;
use dp_table::{ForkSet, Seat};
use tracing::debug;

use crate::strategy::{acquire_in_order, release_pair};
use crate::{AllocationStrategy, StrategyResult};

pub struct Asymmetric {
    forks: Arc<ForkSet>,
}

impl Asymmetric {
    pub fn new(forks: Arc<ForkSet>) -> Self {
        Self { forks }
    }
}

impl AllocationStrategy for Asymmetric {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Asymmetric
    }

    fn acquire_both(&self, seat: &Seat) -> StrategyResult<()> {
        let (first, second) = if seat.left > seat.right {
            (seat.right, seat.left)
        } else {
            (seat.left, seat.right)
        };
        debug!(%seat, %first, %second, "reaching for forks");
        acquire_in_order(&self.forks, seat.id, first, second)
    }

    fn release_both(&self, seat: &Seat) -> StrategyResult<()> {
        release_pair(&self.forks, seat.id, seat.forks())
    }
}
