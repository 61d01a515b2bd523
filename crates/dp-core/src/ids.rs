//! Strongly typed identifier wrappers for seats and forks.
//!
//! Both IDs are `Copy + Ord + Hash`.  Ordering matters here: the hierarchy
//! and message-passing strategies rely on `ForkId`'s total order to pick
//! which fork to reach for first.

use std::fmt;

/// Generate a typed ID wrapper around `u32` with a human-readable prefix.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident => $label:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u32);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " {}"), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                u32::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Seat index of a philosopher at the table, `0..agents`.
    pub struct AgentId => "seat";
}

typed_id! {
    /// Index of a fork, `0..agents`.  Fork `i` lies between seat `i - 1`
    /// and seat `i` (mod N).
    pub struct ForkId => "fork";
}

impl AgentId {
    /// Left fork of this seat in an `n`-seat ring: fork `i`.
    #[inline]
    pub fn left_fork(self) -> ForkId {
        ForkId(self.0)
    }

    /// Right fork of this seat in an `n`-seat ring: fork `(i + 1) mod n`.
    #[inline]
    pub fn right_fork(self, n: usize) -> ForkId {
        ForkId(((self.index() + 1) % n) as u32)
    }
}
