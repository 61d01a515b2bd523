use dp_core::{AgentId, DpError, ForkId};
use dp_table::TableError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error(transparent)]
    Config(#[from] DpError),

    #[error("fork set error: {0}")]
    Table(#[from] TableError),

    /// The strategy's own bookkeeping granted a fork the `ForkSet` says is
    /// already taken.  Two seats would be eating with the same fork.
    #[error("{fork} granted to {agent} but already held in the fork set")]
    Inconsistent { fork: ForkId, agent: AgentId },

    #[error("token channel for {0} closed")]
    ChannelClosed(ForkId),

    #[error("{what} lock was poisoned by a panicking philosopher")]
    Poisoned { what: &'static str },
}

pub type StrategyResult<T> = Result<T, StrategyError>;
