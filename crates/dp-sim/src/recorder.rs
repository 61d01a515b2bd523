//! Finish-order recorder shared by every seat of one run.

use std::sync::{Mutex, MutexGuard};

use dp_core::AgentId;

use crate::{SimError, SimResult};

/// Append-only finish order, guarded by one mutex.
///
/// The driver owns the recorder and lends each seat a reference to it for
/// the length of one run; there is no process-wide instance.  A seat appends itself once, when it leaves the
/// table.
#[derive(Debug, Default)]
pub struct ResultRecorder {
    finished: Mutex<Vec<AgentId>>,
}

impl ResultRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> SimResult<MutexGuard<'_, Vec<AgentId>>> {
        self.finished.lock().map_err(|_| SimError::Poisoned { what: "result recorder" })
    }

    /// Append `agent` and return its 0-based finishing position.
    pub fn record(&self, agent: AgentId) -> SimResult<usize> {
        let mut finished = self.lock()?;
        if finished.contains(&agent) {
            return Err(SimError::DuplicateFinish(agent));
        }
        finished.push(agent);
        Ok(finished.len() - 1)
    }

    /// Copy of the finish order so far.
    pub fn snapshot(&self) -> SimResult<Vec<AgentId>> {
        Ok(self.lock()?.clone())
    }

    pub fn len(&self) -> SimResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> SimResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Forget everything recorded.  Called by the driver before each run.
    pub fn clear(&self) -> SimResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}
