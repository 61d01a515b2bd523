//! `dp-core`: foundational types for the dining-philosophers harness.
//!
//! This crate is a dependency of every other `dp-*` crate.  It has no `dp-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                             |
//! |------------|----------------------------------------------------------------------|
//! | [`ids`]    | `AgentId`, `ForkId`                                                  |
//! | [`config`] | `DinnerConfig`, `RawDinnerConfig`, `StrategyKind`, `ArbiterPriority` |
//! | [`rng`]    | `AgentRng` (per-agent, seeded)                                       |
//! | [`error`]  | `DpError`, `DpResult`                                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                  |
//! |---------|---------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids and config types. |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{ArbiterPriority, DinnerConfig, RawDinnerConfig, StrategyKind};
pub use error::{DpError, DpResult};
pub use ids::{AgentId, ForkId};
pub use rng::AgentRng;
