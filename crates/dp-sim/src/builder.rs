//! Fluent builder for constructing a [`Dinner`].

use std::sync::Arc;

use dp_core::{DinnerConfig, DpError};
use dp_strategy::{AllocationStrategy, StrategyResult, build_strategy};
use dp_table::{ForkSet, Seat, make_named_ring, make_ring};

use crate::{Dinner, DinnerObserver, NoopObserver, SimResult};

/// Builds the strategy for one run.  Called afresh on every run with that
/// run's fork set.
pub type StrategyFactory =
    dyn Fn(&DinnerConfig, Arc<ForkSet>, &[Seat]) -> StrategyResult<Arc<dyn AllocationStrategy>> + Send + Sync;

/// Fluent builder for [`Dinner`].
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                                   |
/// |------------------------|-------------------------------------------|
/// | `.names(v)`            | `make_ring(config.agents)` names          |
/// | `.observer(o)`         | [`NoopObserver`]                          |
/// | `.strategy_factory(f)` | [`build_strategy`] from `config.strategy` |
///
/// # Example
///
/// ```rust,ignore
/// let dinner = DinnerBuilder::new(DinnerConfig::new(5, StrategyKind::PairLock))
///     .names(vec!["Kant".into(), "Hume".into(), "Descartes".into(), "Nietzsche".into(), "Wittgenstein".into()])
///     .build()?;
/// let report = dinner.run()?;
/// ```
pub struct DinnerBuilder {
    config:   DinnerConfig,
    names:    Option<Vec<String>>,
    observer: Option<Arc<dyn DinnerObserver>>,
    factory:  Option<Arc<StrategyFactory>>,
}

impl DinnerBuilder {
    pub fn new(config: DinnerConfig) -> Self {
        Self { config, names: None, observer: None, factory: None }
    }

    /// Name the philosophers, in seat order.  Must be length `config.agents`.
    pub fn names(mut self, names: Vec<String>) -> Self {
        self.names = Some(names);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn DinnerObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Replace the strategy constructor, e.g. to run a custom
    /// [`AllocationStrategy`] that `StrategyKind` does not name.
    pub fn strategy_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&DinnerConfig, Arc<ForkSet>, &[Seat]) -> StrategyResult<Arc<dyn AllocationStrategy>>
            + Send
            + Sync
            + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Validate the configuration and seat the table.  No thread is started.
    pub fn build(self) -> SimResult<Dinner> {
        self.config.validate()?;

        let seats = match self.names {
            Some(names) => {
                if names.len() != self.config.agents {
                    return Err(DpError::Config(format!(
                        "{} names given for {} philosophers",
                        names.len(),
                        self.config.agents
                    ))
                    .into());
                }
                make_named_ring(&names)?
            }
            None => make_ring(self.config.agents)?,
        };

        let observer: Arc<dyn DinnerObserver> = match self.observer {
            Some(o) => o,
            None    => Arc::new(NoopObserver),
        };
        let factory: Arc<StrategyFactory> = match self.factory {
            Some(f) => f,
            None    => Arc::new(build_strategy),
        };

        Ok(Dinner::from_parts(self.config, seats, observer, factory))
    }
}

