//! Mutual-exclusion instrumentation for the eating phase.
//!
//! The monitor is independent of whatever the strategy uses to hand out
//! forks.  Every seat checks in when it starts eating and out when it stops;
//! the monitor keeps its own "who is eating with this fork" table and the
//! fork set's holder records, and logs a violation when either says two
//! seats overlap.

use std::fmt;
use std::sync::Mutex;

use dp_core::{AgentId, ForkId};
use dp_table::{ForkSet, Seat};
use tracing::error;

use crate::{SimError, SimResult};

/// One observed breach of mutual exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusionViolation {
    pub fork:  ForkId,
    /// Seat that started eating.
    pub agent: AgentId,
    /// Seat already eating with `fork`, or `None` if the fork set does not
    /// record `agent` as the fork's holder.
    pub other: Option<AgentId>,
}

impl fmt::Display for ExclusionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.other {
            Some(other) => write!(f, "{} ate with {} while {} was using it", self.agent, self.fork, other),
            None        => write!(f, "{} ate without holding {}", self.agent, self.fork),
        }
    }
}

pub struct ExclusionMonitor {
    eating_with: Vec<Mutex<Option<AgentId>>>,
    violations:  Mutex<Vec<ExclusionViolation>>,
}

impl ExclusionMonitor {
    pub fn new(forks: usize) -> Self {
        Self {
            eating_with: (0..forks).map(|_| Mutex::new(None)).collect(),
            violations:  Mutex::new(Vec::new()),
        }
    }

    fn flag(&self, violation: ExclusionViolation) -> SimResult<()> {
        error!(%violation, "mutual exclusion violated");
        self.violations
            .lock()
            .map_err(|_| SimError::Poisoned { what: "exclusion monitor" })?
            .push(violation);
        Ok(())
    }

    /// Check `seat` in as eating.  Violations are recorded, not returned, so
    /// the run continues and every breach is counted.
    pub fn enter(&self, seat: &Seat, forks: &ForkSet) -> SimResult<()> {
        for fork in seat.forks() {
            if !forks.is_held_by(fork, seat.id)? {
                self.flag(ExclusionViolation { fork, agent: seat.id, other: None })?;
            }
            let slot = self
                .eating_with
                .get(fork.index())
                .ok_or(SimError::Table(dp_table::TableError::UnknownFork(fork)))?;
            let mut slot = slot.lock().map_err(|_| SimError::Poisoned { what: "exclusion monitor" })?;
            match *slot {
                Some(other) if other != seat.id => {
                    drop(slot);
                    self.flag(ExclusionViolation { fork, agent: seat.id, other: Some(other) })?;
                }
                _ => *slot = Some(seat.id),
            }
        }
        Ok(())
    }

    /// Check `seat` out.  Slots owned by someone else are left alone.
    pub fn leave(&self, seat: &Seat) -> SimResult<()> {
        for fork in seat.forks() {
            if let Some(slot) = self.eating_with.get(fork.index()) {
                let mut slot = slot.lock().map_err(|_| SimError::Poisoned { what: "exclusion monitor" })?;
                if *slot == Some(seat.id) {
                    *slot = None;
                }
            }
        }
        Ok(())
    }

    pub fn violations(&self) -> SimResult<Vec<ExclusionViolation>> {
        Ok(self
            .violations
            .lock()
            .map_err(|_| SimError::Poisoned { what: "exclusion monitor" })?
            .clone())
    }
}
