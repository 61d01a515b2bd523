//! Forks as messages.
//!
//! Each fork is a single-slot `crossbeam` channel that starts with one token
//! in it.  Picking a fork up means receiving its token; putting it down means
//! sending the token back.  A seat receives its two tokens in ascending fork
//! order, which is the hierarchy rule expressed as message transfer instead
//! of lock calls.

use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use dp_core::{AgentId, ForkId, StrategyKind};
use dp_table::{ForkSet, Seat, TableError};
use tracing::debug;

use crate::strategy::{claim_granted, release_pair};
use crate::{AllocationStrategy, StrategyError, StrategyResult};

/// Proof of holding a fork.
#[derive(Debug)]
struct ForkToken(ForkId);

struct Conduit {
    tx: Sender<ForkToken>,
    rx: Receiver<ForkToken>,
}

pub struct MessagePassing {
    forks:    Arc<ForkSet>,
    conduits: Vec<Conduit>,
}

impl MessagePassing {
    /// One conduit per fork, each primed with its token.
    pub fn new(forks: Arc<ForkSet>) -> StrategyResult<Self> {
        let conduits = (0..forks.len())
            .map(|i| -> StrategyResult<Conduit> {
                let fork = ForkId(i as u32);
                let (tx, rx) = channel::bounded(1);
                tx.send(ForkToken(fork)).map_err(|_| StrategyError::ChannelClosed(fork))?;
                Ok(Conduit { tx, rx })
            })
            .collect::<StrategyResult<Vec<_>>>()?;
        Ok(Self { forks, conduits })
    }

    fn conduit(&self, fork: ForkId) -> StrategyResult<&Conduit> {
        self.conduits
            .get(fork.index())
            .ok_or(StrategyError::Table(TableError::UnknownFork(fork)))
    }

    fn take(&self, fork: ForkId) -> StrategyResult<()> {
        let ForkToken(got) = self
            .conduit(fork)?
            .rx
            .recv()
            .map_err(|_| StrategyError::ChannelClosed(fork))?;
        debug_assert_eq!(got, fork, "token arrived on the wrong conduit");
        Ok(())
    }

    /// Put a token back.  The slot is empty whenever the token is out, so a
    /// full slot means the fork is being returned twice.
    fn give_back(&self, fork: ForkId, agent: AgentId) -> StrategyResult<()> {
        match self.conduit(fork)?.tx.try_send(ForkToken(fork)) {
            Ok(())                             => Ok(()),
            Err(TrySendError::Full(_))         => Err(StrategyError::Inconsistent { fork, agent }),
            Err(TrySendError::Disconnected(_)) => Err(StrategyError::ChannelClosed(fork)),
        }
    }
}

impl AllocationStrategy for MessagePassing {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MessagePassing
    }

    fn acquire_both(&self, seat: &Seat) -> StrategyResult<()> {
        self.take(seat.low)?;
        if let Err(e) = self.take(seat.high) {
            self.give_back(seat.low, seat.id)?;
            return Err(e);
        }
        debug!(%seat, "both tokens received");
        if let Err(e) = claim_granted(&self.forks, seat, [seat.low, seat.high]) {
            self.give_back(seat.high, seat.id)?;
            self.give_back(seat.low, seat.id)?;
            return Err(e);
        }
        Ok(())
    }

    fn release_both(&self, seat: &Seat) -> StrategyResult<()> {
        let released = release_pair(&self.forks, seat.id, [seat.high, seat.low]);
        let high = self.give_back(seat.high, seat.id);
        let low = self.give_back(seat.low, seat.id);
        released?;
        high?;
        low
    }
}
