//! The `AllocationStrategy` trait: the extension point every variant plugs into.

use dp_core::{AgentId, ForkId, StrategyKind};
use dp_table::{ForkSet, Seat};
use tracing::error;

use crate::{StrategyError, StrategyResult};

/// Counters a strategy exposes after a run.  Fields a strategy does not
/// track stay at their defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrategyStats {
    /// Requests granted (arbiter).
    pub grants:        u64,
    /// Requests refused and retried (arbiter).
    pub denials:       u64,
    /// Times a seat had to block before getting its pair (pair lock, gate).
    pub waits:         u64,
    /// Highest number of seats simultaneously admitted (admission gate).
    pub peak_admitted: Option<usize>,
}

/// Pluggable fork allocation policy.
///
/// One strategy instance is shared by every seat at the table, so
/// implementations must be `Send + Sync`; per-table state (gate counts,
/// token channels, arbiter bookkeeping) lives inside the instance behind its
/// own synchronisation.
///
/// # Contract
///
/// - `acquire_both` blocks until both of `seat`'s forks are held by `seat`
///   in the shared `ForkSet`.  On error nothing is left held.
/// - `release_both` frees both forks and any strategy-side bookkeeping.  It
///   is called exactly once per successful `acquire_both`.
///
/// Prefer [`dine`] over calling the pair directly; the returned guard
/// releases on every exit path.
pub trait AllocationStrategy: Send + Sync + 'static {
    fn kind(&self) -> StrategyKind;

    fn acquire_both(&self, seat: &Seat) -> StrategyResult<()>;

    fn release_both(&self, seat: &Seat) -> StrategyResult<()>;

    fn stats(&self) -> StrategyStats {
        StrategyStats::default()
    }
}

/// Both forks of one seat, held until [`release`](Self::release) or drop.
#[must_use = "dropping HeldForks immediately puts the forks back"]
pub struct HeldForks<'a> {
    strategy: &'a dyn AllocationStrategy,
    seat:     &'a Seat,
    released: bool,
}

impl<'a> HeldForks<'a> {
    pub fn seat(&self) -> &'a Seat {
        self.seat
    }

    /// Put both forks back, reporting any failure.
    pub fn release(mut self) -> StrategyResult<()> {
        self.released = true;
        self.strategy.release_both(self.seat)
    }
}

impl Drop for HeldForks<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.strategy.release_both(self.seat) {
            error!(seat = %self.seat, error = %e, "failed to put forks back on unwind");
        }
    }
}

/// Acquire both of `seat`'s forks through `strategy`.
pub fn dine<'a>(strategy: &'a dyn AllocationStrategy, seat: &'a Seat) -> StrategyResult<HeldForks<'a>> {
    strategy.acquire_both(seat)?;
    Ok(HeldForks { strategy, seat, released: false })
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Block on `first`, then on `second`.  If the second acquire fails the first
/// fork is put back before the error is returned.
pub(crate) fn acquire_in_order(
    forks:  &ForkSet,
    agent:  AgentId,
    first:  ForkId,
    second: ForkId,
) -> StrategyResult<()> {
    forks.acquire(first, agent)?;
    if let Err(e) = forks.acquire(second, agent) {
        let _ = forks.release(first, agent);
        return Err(e.into());
    }
    Ok(())
}

/// Release both forks, attempting the second even if the first fails.
/// Returns the first error seen.
pub(crate) fn release_pair(forks: &ForkSet, agent: AgentId, pair: [ForkId; 2]) -> StrategyResult<()> {
    let a = forks.release(pair[0], agent);
    let b = forks.release(pair[1], agent);
    a?;
    b?;
    Ok(())
}

/// Mark forks the strategy has already granted as held in the `ForkSet`.
///
/// Used by strategies whose own bookkeeping decides ownership.  A fork that
/// is not free here means the bookkeeping and the fork set disagree.
pub(crate) fn claim_granted(forks: &ForkSet, seat: &Seat, pair: [ForkId; 2]) -> StrategyResult<()> {
    for (i, &fork) in pair.iter().enumerate() {
        if !forks.try_acquire(fork, seat.id)? {
            for &taken in &pair[..i] {
                let _ = forks.release(taken, seat.id);
            }
            error!(%seat, %fork, "granted fork is already held");
            return Err(StrategyError::Inconsistent { fork, agent: seat.id });
        }
    }
    Ok(())
}
