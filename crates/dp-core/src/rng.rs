//! Deterministic per-agent RNG for think/eat jitter.
//!
//! Each philosopher gets its own `SmallRng` seeded by:
//!
//!   seed = run_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive seat numbers across the seed space.  The RNG is
//! moved into the philosopher's thread and never shared, so drawing jitter
//! needs no synchronisation.  Thread interleaving is still up to the OS; the
//! seed fixes the *delays*, not the schedule.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-agent deterministic RNG.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's seed and a seat.
    pub fn new(run_seed: u64, agent: AgentId) -> Self {
        let seed = run_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// A random delay in `[0, max]`.  `max == 0` always yields zero without
    /// touching the RNG state.
    pub fn jitter(&mut self, max: Duration) -> Duration {
        if max.is_zero() {
            return Duration::ZERO;
        }
        let nanos = u64::try_from(max.as_nanos()).unwrap_or(u64::MAX);
        Duration::from_nanos(self.0.gen_range(0..=nanos))
    }

    /// `base` plus a random jitter in `[0, max_jitter]`.
    #[inline]
    pub fn jittered(&mut self, base: Duration, max_jitter: Duration) -> Duration {
        base.saturating_add(self.jitter(max_jitter))
    }
}
