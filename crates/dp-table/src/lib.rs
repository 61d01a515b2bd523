//! `dp-table`: the table: forks between the seats, and who sits where.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | [`forks`] | `ForkSet`: N blocking exclusion primitives with a ledger  |
//! | [`seat`]  | `Seat`: one philosopher's identity and assigned fork pair |
//! | [`ring`]  | `make_ring`, `make_named_ring`, `PHILOSOPHERS`            |
//! | [`error`] | `TableError`, `TableResult<T>`                            |
//!
//! # Ring layout
//!
//! ```text
//!            fork 0
//!    seat 4          seat 0
//!  fork 4                fork 1
//!    seat 3          seat 1
//!       fork 3   seat 2   fork 2
//! ```
//!
//! Seat `i` has `left = fork i` and `right = fork (i + 1) mod N`, so every
//! adjacent pair of seats shares exactly one fork and there are as many forks
//! as seats.

pub mod error;
pub mod forks;
pub mod ring;
pub mod seat;


pub use error::{TableError, TableResult};
pub use forks::{ForkLedger, ForkSet};
pub use ring::{PHILOSOPHERS, make_named_ring, make_ring};
pub use seat::Seat;
