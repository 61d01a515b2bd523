use dp_core::{AgentId, DpError, ForkId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error(transparent)]
    Config(#[from] DpError),

    #[error("{0} does not exist at this table")]
    UnknownFork(ForkId),

    #[error("{agent} released {fork} but the holder is {holder:?}")]
    NotHolder {
        fork:   ForkId,
        agent:  AgentId,
        holder: Option<AgentId>,
    },

    #[error("lock for {0} was poisoned by a panicking philosopher")]
    Poisoned(ForkId),
}

pub type TableResult<T> = Result<T, TableError>;
