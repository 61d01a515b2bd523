//! What a finished dinner hands back to the caller.

use std::time::Duration;

use dp_core::{AgentId, StrategyKind};
use dp_strategy::StrategyStats;
use dp_table::{ForkLedger, Seat};

/// Per-seat totals, gathered by the seat's own thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatSummary {
    pub agent:        AgentId,
    pub name:         String,
    pub meals:        u32,
    /// Sum of the time spent in `Acquiring` across all meals.
    pub total_wait:   Duration,
    pub longest_wait: Duration,
}

impl SeatSummary {
    pub(crate) fn new(seat: &Seat) -> Self {
        Self {
            agent:        seat.id,
            name:         seat.name.clone(),
            meals:        0,
            total_wait:   Duration::ZERO,
            longest_wait: Duration::ZERO,
        }
    }

    pub(crate) fn record_meal(&mut self, waited: Duration) {
        self.meals += 1;
        self.total_wait += waited;
        self.longest_wait = self.longest_wait.max(waited);
    }

    /// Mean wait per meal; zero for a seat that never ate.
    pub fn mean_wait(&self) -> Duration {
        if self.meals == 0 {
            Duration::ZERO
        } else {
            self.total_wait / self.meals
        }
    }
}

/// Outcome of one audited run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub strategy:       StrategyKind,
    /// The table, indexed by `AgentId`.
    pub seats:          Vec<Seat>,
    /// Finish order, as recorded.
    pub order:          Vec<AgentId>,
    pub elapsed:        Duration,
    /// Indexed by `AgentId`.
    pub summaries:      Vec<SeatSummary>,
    pub ledger:         Vec<ForkLedger>,
    pub strategy_stats: StrategyStats,
}

impl RunReport {
    /// Philosopher names in the order they finished.
    pub fn completion_order(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|id| self.seats.get(id.index()))
            .map(|seat| seat.name.as_str())
            .collect()
    }

    pub fn total_meals(&self) -> u64 {
        self.summaries.iter().map(|s| u64::from(s.meals)).sum()
    }

    /// Mean wait per meal across the whole table; zero if nobody ate.
    pub fn mean_wait(&self) -> Duration {
        let total: Duration = self.summaries.iter().map(|s| s.total_wait).sum();
        match u32::try_from(self.total_meals()) {
            Ok(0) => Duration::ZERO,
            Ok(meals) => total / meals,
            Err(_) => total.div_f64(self.total_meals() as f64),
        }
    }

    /// Highest per-seat mean wait: the philosopher the strategy served worst.
    pub fn worst_mean_wait(&self) -> Duration {
        self.summaries.iter().map(SeatSummary::mean_wait).max().unwrap_or_default()
    }
}
