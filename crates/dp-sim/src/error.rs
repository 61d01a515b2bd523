use std::time::Duration;

use dp_core::{AgentId, DpError, ForkId, StrategyKind};
use dp_strategy::StrategyError;
use dp_table::TableError;
use thiserror::Error;

use crate::ExclusionViolation;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] DpError),

    #[error("table error: {0}")]
    Table(#[from] TableError),

    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("could not start a seat thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("{0} panicked")]
    AgentPanicked(AgentId),

    #[error("{0} tried to leave the table twice")]
    DuplicateFinish(AgentId),

    #[error("only {got} of {expected} philosophers finished")]
    Incomplete { expected: usize, got: usize },

    #[error("{total} mutual exclusion violation(s), first: {first}")]
    Exclusion { first: ExclusionViolation, total: usize },

    #[error("{fork} unbalanced after the run: acquired {acquired}, released {released}, holder {holder:?}")]
    Conservation {
        fork:     ForkId,
        acquired: u64,
        released: u64,
        holder:   Option<AgentId>,
    },

    /// The run did not finish in time.  The core cannot see a deadlock
    /// itself; this is raised by [`run_with_timeout`](crate::run_with_timeout).
    #[error("{strategy} dinner did not finish within {timeout:?}: deadlock or starvation")]
    Deadlock { strategy: StrategyKind, timeout: Duration },

    #[error("the dinner was called off before every philosopher finished")]
    Aborted,

    #[error("{what} lock was poisoned by a panicking philosopher")]
    Poisoned { what: &'static str },
}

pub type SimResult<T> = Result<T, SimError>;
