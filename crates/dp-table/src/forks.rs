//! The fork set: one blocking binary exclusion primitive per fork.
//!
//! Each fork is a `Mutex<Option<AgentId>>` (who holds it, if anyone) paired
//! with a `Condvar` signalled on release.  The mutex is only held for the
//! instant it takes to flip the holder; a philosopher "holding a fork" owns
//! the logical fork, not the mutex, so a fork can be held across the eating
//! sleep without blocking anyone who merely inspects the ledger.
//!
//! Every acquisition and release is counted.  At the end of a clean run each
//! fork is free and `acquired == released`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};

use dp_core::{AgentId, ForkId};
use tracing::trace;

use crate::{TableError, TableResult};

struct Fork {
    holder:   Mutex<Option<AgentId>>,
    freed:    Condvar,
    acquired: AtomicU64,
    released: AtomicU64,
}

impl Fork {
    fn new() -> Self {
        Self {
            holder:   Mutex::new(None),
            freed:    Condvar::new(),
            acquired: AtomicU64::new(0),
            released: AtomicU64::new(0),
        }
    }
}

/// Point-in-time accounting for one fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForkLedger {
    pub fork:     ForkId,
    pub acquired: u64,
    pub released: u64,
    pub holder:   Option<AgentId>,
}

impl ForkLedger {
    /// Free and every acquisition matched by a release.
    pub fn is_balanced(&self) -> bool {
        self.holder.is_none() && self.acquired == self.released
    }
}

/// N forks shared by the philosophers at one table.
///
/// `ForkSet` is `Sync`; share it between seat threads behind an `Arc`.
pub struct ForkSet {
    forks: Vec<Fork>,
}

impl ForkSet {
    /// Create `count` free forks with ids `0..count`.
    pub fn new(count: usize) -> Self {
        Self { forks: (0..count).map(|_| Fork::new()).collect() }
    }

    pub fn len(&self) -> usize {
        self.forks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forks.is_empty()
    }

    fn fork(&self, id: ForkId) -> TableResult<&Fork> {
        self.forks.get(id.index()).ok_or(TableError::UnknownFork(id))
    }

    fn lock(fork: &Fork, id: ForkId) -> TableResult<MutexGuard<'_, Option<AgentId>>> {
        fork.holder.lock().map_err(|_| TableError::Poisoned(id))
    }

    /// Block until `id` is free, then mark it held by `agent`.
    pub fn acquire(&self, id: ForkId, agent: AgentId) -> TableResult<()> {
        let fork = self.fork(id)?;
        let mut holder = Self::lock(fork, id)?;
        while holder.is_some() {
            holder = fork.freed.wait(holder).map_err(|_| TableError::Poisoned(id))?;
        }
        *holder = Some(agent);
        fork.acquired.fetch_add(1, Ordering::Relaxed);
        trace!(%agent, fork = %id, "fork acquired");
        Ok(())
    }

    /// Take `id` for `agent` if it is free right now.  Never blocks on the
    /// fork itself.
    pub fn try_acquire(&self, id: ForkId, agent: AgentId) -> TableResult<bool> {
        let fork = self.fork(id)?;
        let mut holder = Self::lock(fork, id)?;
        if holder.is_some() {
            return Ok(false);
        }
        *holder = Some(agent);
        fork.acquired.fetch_add(1, Ordering::Relaxed);
        trace!(%agent, fork = %id, "fork acquired without waiting");
        Ok(true)
    }

    /// Free `id` and wake one waiter.
    ///
    /// Fails with [`TableError::NotHolder`] if `agent` does not hold it;
    /// the fork is left untouched in that case.
    pub fn release(&self, id: ForkId, agent: AgentId) -> TableResult<()> {
        let fork = self.fork(id)?;
        let mut holder = Self::lock(fork, id)?;
        if *holder != Some(agent) {
            return Err(TableError::NotHolder { fork: id, agent, holder: *holder });
        }
        *holder = None;
        fork.released.fetch_add(1, Ordering::Relaxed);
        drop(holder);
        fork.freed.notify_one();
        trace!(%agent, fork = %id, "fork released");
        Ok(())
    }

    /// Current holder of `id`.
    pub fn holder(&self, id: ForkId) -> TableResult<Option<AgentId>> {
        let fork = self.fork(id)?;
        Ok(*Self::lock(fork, id)?)
    }

    /// `true` if `agent` currently holds `id`.
    pub fn is_held_by(&self, id: ForkId, agent: AgentId) -> TableResult<bool> {
        Ok(self.holder(id)? == Some(agent))
    }

    /// Accounting snapshot for every fork, in id order.
    pub fn ledger(&self) -> TableResult<Vec<ForkLedger>> {
        self.forks
            .iter()
            .enumerate()
            .map(|(i, fork)| {
                let id = ForkId(i as u32);
                let holder = *Self::lock(fork, id)?;
                Ok(ForkLedger {
                    fork:     id,
                    acquired: fork.acquired.load(Ordering::Relaxed),
                    released: fork.released.load(Ordering::Relaxed),
                    holder,
                })
            })
            .collect()
    }

    /// `true` if no fork is held.
    pub fn all_free(&self) -> TableResult<bool> {
        Ok(self.ledger()?.iter().all(|l| l.holder.is_none()))
    }
}
