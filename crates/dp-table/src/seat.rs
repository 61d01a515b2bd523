//! One philosopher's place at the table.

use std::fmt;

use dp_core::{AgentId, ForkId};

/// A seated philosopher: identity plus the two forks it may use.
///
/// Seats are built once by [`make_ring`](crate::make_ring) and are read-only
/// afterwards.  The meal counter is not stored here; it lives in the seat's
/// own thread so no other thread can touch it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Seat {
    pub id:    AgentId,
    pub name:  String,
    pub left:  ForkId,
    pub right: ForkId,
    /// `min(left, right)`, fixed at setup.
    pub low:   ForkId,
    /// `max(left, right)`, fixed at setup.
    pub high:  ForkId,
}

impl Seat {
    pub fn new(id: AgentId, name: impl Into<String>, left: ForkId, right: ForkId) -> Self {
        Self {
            id,
            name: name.into(),
            left,
            right,
            low:  left.min(right),
            high: left.max(right),
        }
    }

    /// `[left, right]`.
    #[inline]
    pub fn forks(&self) -> [ForkId; 2] {
        [self.left, self.right]
    }

    /// `true` if the two seats have a fork in common.
    pub fn shares_fork_with(&self, other: &Seat) -> bool {
        self.id != other.id && self.forks().iter().any(|f| other.forks().contains(f))
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
