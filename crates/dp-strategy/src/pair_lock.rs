//! Atomic pair locking.
//!
//! [`PairTable`] is one combined exclusion primitive over every fork: a
//! mutex-protected occupancy table plus a condvar.  `lock_pair(a, b)` waits
//! until *both* forks are free and marks them taken in the same critical
//! section, so no seat is ever observed holding one fork and waiting for the
//! other.  Without partial holdings there is nothing for a wait cycle to be
//! made of.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use dp_core::{ForkId, StrategyKind};
use dp_table::{ForkSet, Seat, TableError};
use tracing::debug;

use crate::strategy::{claim_granted, release_pair};
use crate::{AllocationStrategy, StrategyError, StrategyResult, StrategyStats};

// ── PairTable ─────────────────────────────────────────────────────────────────

pub struct PairTable {
    taken: Mutex<Vec<bool>>,
    freed: Condvar,
}

impl PairTable {
    pub fn new(forks: usize) -> Self {
        Self { taken: Mutex::new(vec![false; forks]), freed: Condvar::new() }
    }

    fn lock(&self) -> StrategyResult<MutexGuard<'_, Vec<bool>>> {
        self.taken.lock().map_err(|_| StrategyError::Poisoned { what: "pair table" })
    }

    fn check(taken: &[bool], fork: ForkId) -> StrategyResult<()> {
        if fork.index() >= taken.len() {
            return Err(TableError::UnknownFork(fork).into());
        }
        Ok(())
    }

    /// Take `a` and `b` together, blocking until both are free.
    ///
    /// Returns `true` if the call had to wait.
    pub fn lock_pair(&self, a: ForkId, b: ForkId) -> StrategyResult<bool> {
        let mut taken = self.lock()?;
        Self::check(&taken, a)?;
        Self::check(&taken, b)?;
        let mut waited = false;
        while taken[a.index()] || taken[b.index()] {
            waited = true;
            taken = self
                .freed
                .wait(taken)
                .map_err(|_| StrategyError::Poisoned { what: "pair table" })?;
        }
        taken[a.index()] = true;
        taken[b.index()] = true;
        Ok(waited)
    }

    /// Take `a` and `b` together only if both are free now.
    pub fn try_lock_pair(&self, a: ForkId, b: ForkId) -> StrategyResult<bool> {
        let mut taken = self.lock()?;
        Self::check(&taken, a)?;
        Self::check(&taken, b)?;
        if taken[a.index()] || taken[b.index()] {
            return Ok(false);
        }
        taken[a.index()] = true;
        taken[b.index()] = true;
        Ok(true)
    }

    /// Give both forks back and wake every waiter; any of them may now fit.
    pub fn unlock_pair(&self, a: ForkId, b: ForkId) -> StrategyResult<()> {
        let mut taken = self.lock()?;
        Self::check(&taken, a)?;
        Self::check(&taken, b)?;
        taken[a.index()] = false;
        taken[b.index()] = false;
        drop(taken);
        self.freed.notify_all();
        Ok(())
    }
}

// ── PairLock strategy ─────────────────────────────────────────────────────────

pub struct PairLock {
    forks: Arc<ForkSet>,
    pairs: PairTable,
    waits: AtomicU64,
}

impl PairLock {
    pub fn new(forks: Arc<ForkSet>) -> Self {
        let pairs = PairTable::new(forks.len());
        Self { forks, pairs, waits: AtomicU64::new(0) }
    }
}

impl AllocationStrategy for PairLock {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PairLock
    }

    fn acquire_both(&self, seat: &Seat) -> StrategyResult<()> {
        if self.pairs.lock_pair(seat.left, seat.right)? {
            self.waits.fetch_add(1, Ordering::Relaxed);
        }
        debug!(%seat, "pair locked");
        if let Err(e) = claim_granted(&self.forks, seat, seat.forks()) {
            self.pairs.unlock_pair(seat.left, seat.right)?;
            return Err(e);
        }
        Ok(())
    }

    fn release_both(&self, seat: &Seat) -> StrategyResult<()> {
        // Free the fork set first so the next grantee finds both forks free.
        let released = release_pair(&self.forks, seat.id, seat.forks());
        self.pairs.unlock_pair(seat.left, seat.right)?;
        released
    }

    fn stats(&self) -> StrategyStats {
        StrategyStats { waits: self.waits.load(Ordering::Relaxed), ..StrategyStats::default() }
    }
}
