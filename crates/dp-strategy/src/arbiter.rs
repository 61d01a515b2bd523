//! Central arbiter ("waiter") strategy.
//!
//! A seat never picks up a fork on its own.  It asks the arbiter, which,
//! under its single mutex, tries both forks without blocking and either
//! grants the pair or rolls back and denies.  A denied seat sleeps on the
//! arbiter's condvar and asks again after the next release.  Because the
//! fork set is only touched while the arbiter mutex is held, a decision can
//! never observe a half-finished allocation, and no seat ever waits while
//! holding a fork.
//!
//! # Priority
//!
//! [`ArbiterPriority::Greedy`] grants whenever both forks are free.
//!
//! [`ArbiterPriority::LongestWaiting`] gives every denied seat a ticket
//! (a monotonically increasing number, cleared on grant).  A request is
//! refused while any rival (a seat sharing one of the requester's forks)
//! holds an older ticket, even if the forks happen to be free.  The oldest
//! waiting ticket at the table is never refused on priority grounds, so it
//! eats as soon as its own forks come back.
//!
//! Releases happen under the arbiter mutex and wake every waiter, so a
//! denied seat cannot miss the release it is waiting for.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use dp_core::{AgentId, ArbiterPriority, DpError, StrategyKind};
use dp_table::{ForkSet, Seat};
use tracing::{debug, trace};

use crate::strategy::release_pair;
use crate::{AllocationStrategy, StrategyError, StrategyResult, StrategyStats};

struct Tickets {
    /// Ticket of each waiting seat; `None` if not currently denied.
    waiting_since: Vec<Option<u64>>,
    next:          u64,
}

pub struct Arbiter {
    forks:    Arc<ForkSet>,
    priority: ArbiterPriority,
    /// Seats sharing at least one fork with each seat.
    rivals:   Vec<Vec<AgentId>>,
    tickets:  Mutex<Tickets>,
    released: Condvar,
    grants:   AtomicU64,
    denials:  AtomicU64,
}

impl Arbiter {
    /// Build an arbiter for `seats` sharing `forks`.
    pub fn new(forks: Arc<ForkSet>, seats: &[Seat], priority: ArbiterPriority) -> Self {
        let rivals = seats
            .iter()
            .map(|seat| {
                seats
                    .iter()
                    .filter(|other| seat.shares_fork_with(other))
                    .map(|other| other.id)
                    .collect()
            })
            .collect();
        Self {
            forks,
            priority,
            rivals,
            tickets: Mutex::new(Tickets { waiting_since: vec![None; seats.len()], next: 0 }),
            released: Condvar::new(),
            grants: AtomicU64::new(0),
            denials: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> StrategyResult<MutexGuard<'_, Tickets>> {
        self.tickets.lock().map_err(|_| StrategyError::Poisoned { what: "arbiter" })
    }

    fn slot(&self, seat: &Seat) -> StrategyResult<usize> {
        let i = seat.id.index();
        if i >= self.rivals.len() {
            return Err(DpError::Config(format!("{seat} is not seated at this arbiter's table")).into());
        }
        Ok(i)
    }

    /// `true` if a rival has been waiting longer than `seat`.
    fn outranked(&self, tickets: &Tickets, seat: usize) -> bool {
        if self.priority == ArbiterPriority::Greedy {
            return false;
        }
        let mine = tickets.waiting_since[seat];
        self.rivals[seat].iter().any(|rival| {
            match (tickets.waiting_since[rival.index()], mine) {
                (Some(theirs), Some(mine)) => theirs < mine,
                (Some(_), None)            => true,
                (None, _)                  => false,
            }
        })
    }

    /// Both-or-neither.  Caller holds the arbiter mutex.
    fn try_grant(&self, tickets: &Tickets, seat: &Seat, slot: usize) -> StrategyResult<bool> {
        if self.outranked(tickets, slot) {
            trace!(%seat, "deferring to a rival that has waited longer");
            return Ok(false);
        }
        if !self.forks.try_acquire(seat.left, seat.id)? {
            return Ok(false);
        }
        if !self.forks.try_acquire(seat.right, seat.id)? {
            self.forks.release(seat.left, seat.id)?;
            return Ok(false);
        }
        Ok(true)
    }
}

impl AllocationStrategy for Arbiter {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Arbiter
    }

    fn acquire_both(&self, seat: &Seat) -> StrategyResult<()> {
        let slot = self.slot(seat)?;
        let mut tickets = self.lock()?;
        loop {
            if self.try_grant(&tickets, seat, slot)? {
                tickets.waiting_since[slot] = None;
                self.grants.fetch_add(1, Ordering::Relaxed);
                debug!(%seat, "arbiter granted both forks");
                return Ok(());
            }
            if tickets.waiting_since[slot].is_none() {
                let ticket = tickets.next;
                tickets.next += 1;
                tickets.waiting_since[slot] = Some(ticket);
            }
            self.denials.fetch_add(1, Ordering::Relaxed);
            debug!(%seat, "arbiter denied, waiting for a release");
            tickets = self
                .released
                .wait(tickets)
                .map_err(|_| StrategyError::Poisoned { what: "arbiter" })?;
        }
    }

    fn release_both(&self, seat: &Seat) -> StrategyResult<()> {
        let tickets = self.lock()?;
        let result = release_pair(&self.forks, seat.id, seat.forks());
        drop(tickets);
        self.released.notify_all();
        result
    }

    fn stats(&self) -> StrategyStats {
        StrategyStats {
            grants:  self.grants.load(Ordering::Relaxed),
            denials: self.denials.load(Ordering::Relaxed),
            ..StrategyStats::default()
        }
    }
}
