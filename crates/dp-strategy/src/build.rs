//! Strategy construction from configuration.

use std::sync::Arc;

use dp_core::{DinnerConfig, StrategyKind};
use dp_table::{ForkSet, Seat};

use crate::{
    AdmissionLimit, AllocationStrategy, Arbiter, Asymmetric, Hierarchy, MessagePassing, PairLock,
    StrategyResult,
};

/// Build the strategy named by `config.strategy` for a table of `seats`
/// sharing `forks`.
///
/// The config is validated again here so a strategy is never built for a
/// table it cannot serve (e.g. an admission limit ≥ N).
pub fn build_strategy(
    config: &DinnerConfig,
    forks:  Arc<ForkSet>,
    seats:  &[Seat],
) -> StrategyResult<Arc<dyn AllocationStrategy>> {
    config.validate()?;
    let strategy: Arc<dyn AllocationStrategy> = match config.strategy {
        StrategyKind::Asymmetric     => Arc::new(Asymmetric::new(forks)),
        StrategyKind::Hierarchy      => Arc::new(Hierarchy::new(forks)),
        StrategyKind::Arbiter        => Arc::new(Arbiter::new(forks, seats, config.arbiter_priority)),
        StrategyKind::AdmissionLimit => {
            Arc::new(AdmissionLimit::new(forks, config.effective_admission_limit())?)
        }
        StrategyKind::PairLock       => Arc::new(PairLock::new(forks)),
        StrategyKind::MessagePassing => Arc::new(MessagePassing::new(forks)?),
    };
    Ok(strategy)
}
