//! Run configuration.
//!
//! # Two layers
//!
//! [`RawDinnerConfig`] is what a caller hands in: signed integers and a
//! strategy name, exactly as they arrive from a command line or a config
//! file.  [`DinnerConfig`] is the validated, typed form the driver runs on.
//! Conversion (`DinnerConfig::try_from(&raw)`) is where every
//! configuration error is raised:
//!
//! - fewer than two agents (no fork pair exists),
//! - negative hunger or negative durations,
//! - an unknown strategy or arbiter priority name,
//! - an admission limit outside `1..agents`.
//!
//! A typed config built directly in code is re-checked by
//! [`DinnerConfig::validate`], which the driver calls before spawning.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::{DpError, DpResult};

// ── StrategyKind ──────────────────────────────────────────────────────────────

/// Which allocation strategy the philosophers use to pick up their forks.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum StrategyKind {
    /// Lower-numbered fork first when `left > right`, else left first.
    #[default]
    Asymmetric,
    /// A central arbiter grants both forks or neither.
    Arbiter,
    /// Forks sorted once at setup; always lowest id first.
    Hierarchy,
    /// At most `limit` (default N-1) philosophers may reach for forks at once.
    AdmissionLimit,
    /// Both forks taken in one indivisible step from a shared pair table.
    PairLock,
    /// Forks are tokens passed through single-slot channels.
    MessagePassing,
}

impl StrategyKind {
    /// Every strategy, in declaration order.
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::Asymmetric,
        StrategyKind::Arbiter,
        StrategyKind::Hierarchy,
        StrategyKind::AdmissionLimit,
        StrategyKind::PairLock,
        StrategyKind::MessagePassing,
    ];

    /// The kebab-case identifier accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Asymmetric     => "asymmetric",
            StrategyKind::Arbiter        => "arbiter",
            StrategyKind::Hierarchy      => "hierarchy",
            StrategyKind::AdmissionLimit => "admission-limit",
            StrategyKind::PairLock       => "pair-lock",
            StrategyKind::MessagePassing => "message-passing",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = DpError;

    fn from_str(s: &str) -> DpResult<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| DpError::UnknownStrategy(s.to_owned()))
    }
}

// ── ArbiterPriority ───────────────────────────────────────────────────────────

/// How the arbiter breaks ties between neighbours competing for a fork.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ArbiterPriority {
    /// Grant whenever both forks are free.
    Greedy,
    /// Deny a request while a neighbour sharing one of the forks has been
    /// waiting longer (holds an older ticket) than the requester.
    #[default]
    LongestWaiting,
}

impl ArbiterPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            ArbiterPriority::Greedy         => "greedy",
            ArbiterPriority::LongestWaiting => "longest-waiting",
        }
    }
}

impl fmt::Display for ArbiterPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArbiterPriority {
    type Err = DpError;

    fn from_str(s: &str) -> DpResult<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "greedy"          => Ok(ArbiterPriority::Greedy),
            "longest-waiting" => Ok(ArbiterPriority::LongestWaiting),
            _                 => Err(DpError::UnknownPriority(s.to_owned())),
        }
    }
}

// ── DinnerConfig ──────────────────────────────────────────────────────────────

/// Validated configuration for one dinner (simulation run).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DinnerConfig {
    /// Number of philosophers, and therefore forks.  At least 2.
    pub agents: usize,

    /// Meals each philosopher eats before leaving.  0 means leave at once.
    pub hunger: u32,

    /// Base thinking time between meals.
    pub think: Duration,

    /// Base eating time (time spent holding both forks).
    pub eat: Duration,

    /// Upper bound of extra random delay added to every think and eat phase.
    /// `Duration::ZERO` disables jitter.
    pub jitter: Duration,

    /// Allocation strategy used by every philosopher.
    pub strategy: StrategyKind,

    /// Seed for the per-agent jitter RNGs.
    pub seed: u64,

    /// Admission gate size for [`StrategyKind::AdmissionLimit`].
    /// `None` uses `agents - 1`.
    pub admission_limit: Option<usize>,

    /// Tie-breaking policy for [`StrategyKind::Arbiter`].
    pub arbiter_priority: ArbiterPriority,
}

impl Default for DinnerConfig {
    fn default() -> Self {
        Self {
            agents:           5,
            hunger:           3,
            think:            Duration::ZERO,
            eat:              Duration::ZERO,
            jitter:           Duration::ZERO,
            strategy:         StrategyKind::Asymmetric,
            seed:             42,
            admission_limit:  None,
            arbiter_priority: ArbiterPriority::LongestWaiting,
        }
    }
}

impl DinnerConfig {
    /// Shorthand for a default config with a given table size and strategy.
    pub fn new(agents: usize, strategy: StrategyKind) -> Self {
        Self { agents, strategy, ..Self::default() }
    }

    /// Check the invariants the type system cannot express.
    pub fn validate(&self) -> DpResult<()> {
        if self.agents < 2 {
            return Err(DpError::Config(format!(
                "at least 2 philosophers are needed to share a fork, got {}",
                self.agents
            )));
        }
        if u32::try_from(self.agents).is_err() {
            return Err(DpError::Config(format!("too many philosophers: {}", self.agents)));
        }
        if let Some(limit) = self.admission_limit {
            if limit == 0 || limit >= self.agents {
                return Err(DpError::Config(format!(
                    "admission limit must be in 1..{} for {} philosophers, got {limit}",
                    self.agents, self.agents
                )));
            }
        }
        Ok(())
    }

    /// Admission gate size actually used: the configured limit or N-1.
    pub fn effective_admission_limit(&self) -> usize {
        self.admission_limit.unwrap_or(self.agents.saturating_sub(1))
    }
}

// ── RawDinnerConfig ───────────────────────────────────────────────────────────

/// Unvalidated caller input.  Durations are milliseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RawDinnerConfig {
    pub agents:           i64,
    pub hunger:           i64,
    pub think_ms:         i64,
    pub eat_ms:           i64,
    pub jitter_ms:        i64,
    pub strategy:         String,
    pub seed:             u64,
    pub admission_limit:  Option<i64>,
    pub arbiter_priority: Option<String>,
}

impl Default for RawDinnerConfig {
    fn default() -> Self {
        Self {
            agents:           5,
            hunger:           3,
            think_ms:         0,
            eat_ms:           0,
            jitter_ms:        0,
            strategy:         StrategyKind::default().as_str().to_owned(),
            seed:             42,
            admission_limit:  None,
            arbiter_priority: None,
        }
    }
}

fn non_negative_ms(what: &str, ms: i64) -> DpResult<Duration> {
    u64::try_from(ms)
        .map(Duration::from_millis)
        .map_err(|_| DpError::Config(format!("{what} must not be negative, got {ms} ms")))
}

impl TryFrom<&RawDinnerConfig> for DinnerConfig {
    type Error = DpError;

    fn try_from(raw: &RawDinnerConfig) -> DpResult<Self> {
        let agents = usize::try_from(raw.agents)
            .map_err(|_| DpError::Config(format!("agent count must not be negative, got {}", raw.agents)))?;
        let hunger = u32::try_from(raw.hunger)
            .map_err(|_| DpError::Config(format!("hunger must be in 0..=u32::MAX, got {}", raw.hunger)))?;
        let admission_limit = raw
            .admission_limit
            .map(|l| {
                usize::try_from(l)
                    .map_err(|_| DpError::Config(format!("admission limit must not be negative, got {l}")))
            })
            .transpose()?;
        let arbiter_priority = match &raw.arbiter_priority {
            Some(p) => p.parse()?,
            None    => ArbiterPriority::default(),
        };

        let config = DinnerConfig {
            agents,
            hunger,
            think:    non_negative_ms("think time", raw.think_ms)?,
            eat:      non_negative_ms("eat time", raw.eat_ms)?,
            jitter:   non_negative_ms("jitter", raw.jitter_ms)?,
            strategy: raw.strategy.parse()?,
            seed:     raw.seed,
            admission_limit,
            arbiter_priority,
        };
        config.validate()?;
        Ok(config)
    }
}
