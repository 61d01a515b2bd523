//! `dp-strategy`: how a philosopher gets hold of two forks without the table
//! deadlocking.
//!
//! # Crate layout
//!
//! | Module              | Contents                                                         |
//! |---------------------|------------------------------------------------------------------|
//! | [`strategy`]        | `AllocationStrategy` trait, `HeldForks` guard, `dine`            |
//! | [`asymmetric`]      | `Asymmetric`: lower fork first only where the ring wraps         |
//! | [`hierarchy`]       | `Hierarchy`: global ascending fork order                         |
//! | [`arbiter`]         | `Arbiter`: central both-or-neither grants                        |
//! | [`admission`]       | `AdmissionGate`, `AdmissionLimit`: at most N-1 contenders        |
//! | [`pair_lock`]       | `PairTable`, `PairLock`: pair taken in one step                  |
//! | [`message_passing`] | `MessagePassing`: forks as channel tokens                        |
//! | [`build`]           | `build_strategy`: `StrategyKind` → `Arc<dyn AllocationStrategy>` |
//! | [`error`]           | `StrategyError`, `StrategyResult<T>`                             |
//!
//! # Contract
//!
//! Every strategy guarantees that after `acquire_both(seat)` returns `Ok`,
//! the shared [`ForkSet`](dp_table::ForkSet) records both of the seat's forks
//! as held by that seat, and that `release_both(seat)` frees them again.
//! Strategies that keep their own bookkeeping (gate, pair table, tokens)
//! still mark the `ForkSet`, so the driver can audit every strategy the same
//! way.  No strategy ever returns with only one fork held.
//!
//! | Strategy         | Deadlock broken by              | Starvation possible  |
//! |------------------|---------------------------------|----------------------|
//! | `Asymmetric`     | one seat reaches the other way  | yes                  |
//! | `Arbiter`        | both-or-neither under one mutex | no (longest-waiting) |
//! | `Hierarchy`      | total order on forks            | yes, high ids        |
//! | `AdmissionLimit` | pigeonhole (N-1 contenders)     | yes                  |
//! | `PairLock`       | no partial acquisition          | yes                  |
//! | `MessagePassing` | total order on token receipt    | yes, high ids        |

pub mod admission;
pub mod arbiter;
pub mod asymmetric;
pub mod build;
pub mod error;
pub mod hierarchy;
pub mod message_passing;
pub mod pair_lock;
pub mod strategy;


pub use admission::{AdmissionGate, AdmissionLimit, GatePass};
pub use arbiter::Arbiter;
pub use asymmetric::Asymmetric;
pub use build::build_strategy;
pub use error::{StrategyError, StrategyResult};
pub use hierarchy::Hierarchy;
pub use message_passing::MessagePassing;
pub use pair_lock::{PairLock, PairTable};
pub use strategy::{AllocationStrategy, HeldForks, StrategyStats, dine};
