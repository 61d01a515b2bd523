//! Start line: every seat waits here until the whole table has arrived.
//!
//! A plain `std::sync::Barrier` cannot be cancelled, so a failed thread
//! spawn, or a seat that unwinds before it arrives, would strand the seats
//! already waiting on it.  The start line can be aborted, releasing everyone
//! with `false`.

use std::sync::{Condvar, Mutex};
use std::thread;

use crate::{SimError, SimResult};

struct Line {
    arrived: usize,
    aborted: bool,
}

pub(crate) struct StartLine {
    expected: usize,
    line:     Mutex<Line>,
    go:       Condvar,
}

impl StartLine {
    pub(crate) fn new(expected: usize) -> Self {
        Self {
            expected,
            line: Mutex::new(Line { arrived: 0, aborted: false }),
            go:   Condvar::new(),
        }
    }

    /// Arrive and block until everyone has.  `Ok(false)` means the run was
    /// called off.
    pub(crate) fn arrive_and_wait(&self) -> SimResult<bool> {
        let poisoned = |_| SimError::Poisoned { what: "start line" };
        let mut line = self.line.lock().map_err(poisoned)?;
        line.arrived += 1;
        if line.arrived >= self.expected {
            self.go.notify_all();
        }
        while line.arrived < self.expected && !line.aborted {
            line = self.go.wait(line).map_err(poisoned)?;
        }
        Ok(!line.aborted)
    }

    pub(crate) fn abort(&self) {
        if let Ok(mut line) = self.line.lock() {
            line.aborted = true;
        }
        self.go.notify_all();
    }
}

/// Calls the start line off if its thread unwinds before [`arrive`](Self::arrive).
pub(crate) struct AbortOnUnwind<'a> {
    line: Option<&'a StartLine>,
}

impl<'a> AbortOnUnwind<'a> {
    pub(crate) fn new(line: &'a StartLine) -> Self {
        Self { line: Some(line) }
    }

    /// Disarm and [`arrive_and_wait`](StartLine::arrive_and_wait).
    pub(crate) fn arrive(mut self) -> SimResult<bool> {
        match self.line.take() {
            Some(line) => line.arrive_and_wait(),
            None => Ok(false),
        }
    }
}

impl Drop for AbortOnUnwind<'_> {
    fn drop(&mut self) {
        if let Some(line) = self.line {
            if thread::panicking() {
                line.abort();
            }
        }
    }
}
