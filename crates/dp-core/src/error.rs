//! Configuration error type shared by every `dp-*` crate.
//!
//! Sub-crates define their own error enums and wrap `DpError` as one variant
//! via `#[from]`, so a bad configuration surfaces unchanged at the driver.

use thiserror::Error;

/// Errors raised while validating run configuration, before any thread starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DpError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown strategy `{0}` (expected one of: asymmetric, arbiter, hierarchy, admission-limit, pair-lock, message-passing)")]
    UnknownStrategy(String),

    #[error("unknown arbiter priority `{0}` (expected greedy or longest-waiting)")]
    UnknownPriority(String),
}

/// Shorthand result type for `dp-core`.
pub type DpResult<T> = Result<T, DpError>;
