//! Admission limiting ("footman").
//!
//! A counting gate lets at most `limit` seats into the acquire phase at
//! once; the default limit is N-1.  Admitted seats pick up left then right
//! with plain blocking acquires, the order that deadlocks an unguarded
//! table.  With only N-1 of N seats contending for N forks, at least one
//! admitted seat finds both of its forks reachable, eats, and releases, so
//! the wait-for cycle can never close.
//!
//! A seat stays admitted from `acquire_both` until `release_both`.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use dp_core::{DpError, StrategyKind};
use dp_table::{ForkSet, Seat};
use tracing::{debug, warn};

use crate::strategy::{acquire_in_order, release_pair};
use crate::{AllocationStrategy, StrategyError, StrategyResult, StrategyStats};

// ── AdmissionGate ─────────────────────────────────────────────────────────────

struct GateState {
    inside: usize,
    peak:   usize,
    waits:  u64,
}

/// A counting gate: one mutex, one condvar, and a fixed capacity.
pub struct AdmissionGate {
    limit:  usize,
    state:  Mutex<GateState>,
    opened: Condvar,
}

impl AdmissionGate {
    /// A gate admitting at most `limit` holders.  `limit` must be positive.
    pub fn new(limit: usize) -> StrategyResult<Self> {
        if limit == 0 {
            return Err(DpError::Config("admission gate limit must be at least 1".into()).into());
        }
        Ok(Self {
            limit,
            state: Mutex::new(GateState { inside: 0, peak: 0, waits: 0 }),
            opened: Condvar::new(),
        })
    }

    fn lock(&self) -> StrategyResult<MutexGuard<'_, GateState>> {
        self.state.lock().map_err(|_| StrategyError::Poisoned { what: "admission gate" })
    }

    /// Block until there is room, then take a place.
    pub fn enter(&self) -> StrategyResult<()> {
        let mut state = self.lock()?;
        if state.inside >= self.limit {
            state.waits += 1;
        }
        while state.inside >= self.limit {
            state = self
                .opened
                .wait(state)
                .map_err(|_| StrategyError::Poisoned { what: "admission gate" })?;
        }
        state.inside += 1;
        state.peak = state.peak.max(state.inside);
        Ok(())
    }

    /// Give up a place and wake one waiter.
    pub fn exit(&self) -> StrategyResult<()> {
        let mut state = self.lock()?;
        if state.inside == 0 {
            warn!("admission gate exited more often than entered");
            return Err(DpError::Config("admission gate exited with nobody inside".into()).into());
        }
        state.inside -= 1;
        drop(state);
        self.opened.notify_one();
        Ok(())
    }

    /// [`enter`](Self::enter) and return a pass that exits on drop.
    pub fn pass(&self) -> StrategyResult<GatePass<'_>> {
        self.enter()?;
        Ok(GatePass { gate: self })
    }

    /// Seats currently admitted.
    pub fn inside(&self) -> StrategyResult<usize> {
        Ok(self.lock()?.inside)
    }

    /// Highest number of seats ever admitted at the same time.
    pub fn peak(&self) -> StrategyResult<usize> {
        Ok(self.lock()?.peak)
    }

    fn waits(&self) -> u64 {
        self.lock().map(|s| s.waits).unwrap_or(0)
    }
}

/// A place inside an [`AdmissionGate`], given back on drop.
#[must_use = "dropping the pass leaves the gate immediately"]
pub struct GatePass<'a> {
    gate: &'a AdmissionGate,
}

impl Drop for GatePass<'_> {
    fn drop(&mut self) {
        let _ = self.gate.exit();
    }
}

// ── AdmissionLimit strategy ───────────────────────────────────────────────────

pub struct AdmissionLimit {
    forks: Arc<ForkSet>,
    gate:  AdmissionGate,
}

impl AdmissionLimit {
    pub fn new(forks: Arc<ForkSet>, limit: usize) -> StrategyResult<Self> {
        Ok(Self { forks, gate: AdmissionGate::new(limit)? })
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }
}

impl AllocationStrategy for AdmissionLimit {
    fn kind(&self) -> StrategyKind {
        StrategyKind::AdmissionLimit
    }

    fn acquire_both(&self, seat: &Seat) -> StrategyResult<()> {
        let pass = self.gate.pass()?;
        debug!(%seat, "admitted, reaching for forks");
        acquire_in_order(&self.forks, seat.id, seat.left, seat.right)?;
        // Stay admitted until release_both.
        std::mem::forget(pass);
        Ok(())
    }

    fn release_both(&self, seat: &Seat) -> StrategyResult<()> {
        let released = release_pair(&self.forks, seat.id, seat.forks());
        self.gate.exit()?;
        released
    }

    fn stats(&self) -> StrategyStats {
        StrategyStats {
            waits:         self.gate.waits(),
            peak_admitted: self.gate.peak().ok(),
            ..StrategyStats::default()
        }
    }
}
