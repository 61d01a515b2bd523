//! The `Dinner` driver: one OS thread per seat, then an audit.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{RecvTimeoutError, bounded};
use dp_core::{AgentRng, DinnerConfig, StrategyKind};
use dp_strategy::{AllocationStrategy, dine};
use dp_table::{ForkSet, Seat};
use tracing::{debug, error, info, warn};

use crate::start::{AbortOnUnwind, StartLine};
use crate::{
    DinnerBuilder, DinnerObserver, ExclusionMonitor, Phase, ResultRecorder, RunReport, SeatSummary,
    SimError, SimResult, StrategyFactory,
};

/// A seated table, ready to run any number of times.
///
/// Built by [`DinnerBuilder`].  Each call to [`run`](Self::run) builds a
/// fresh fork set, strategy, recorder and monitor, so runs are independent
/// and a test suite can repeat them to shake out races.
#[derive(Clone)]
pub struct Dinner {
    config:   DinnerConfig,
    seats:    Vec<Seat>,
    observer: Arc<dyn DinnerObserver>,
    factory:  Arc<StrategyFactory>,
}

/// Everything a seat thread borrows for the length of one run.
struct Table<'a> {
    config:   &'a DinnerConfig,
    forks:    &'a ForkSet,
    strategy: &'a dyn AllocationStrategy,
    monitor:  &'a ExclusionMonitor,
    recorder: &'a ResultRecorder,
    observer: &'a dyn DinnerObserver,
    start:    &'a StartLine,
}

impl Dinner {
    pub(crate) fn from_parts(
        config:   DinnerConfig,
        seats:    Vec<Seat>,
        observer: Arc<dyn DinnerObserver>,
        factory:  Arc<StrategyFactory>,
    ) -> Self {
        Self { config, seats, observer, factory }
    }

    pub fn config(&self) -> &DinnerConfig {
        &self.config
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Run the dinner to completion with a private recorder.
    pub fn run(&self) -> SimResult<RunReport> {
        self.run_with(&ResultRecorder::new())
    }

    /// Run the dinner, recording the finish order into `recorder`.
    ///
    /// The recorder is cleared first.  Blocks until every seat has finished;
    /// a broken strategy therefore blocks forever, which is what
    /// [`run_with_timeout`](Self::run_with_timeout) is for.
    pub fn run_with(&self, recorder: &ResultRecorder) -> SimResult<RunReport> {
        recorder.clear()?;

        let n = self.seats.len();
        let forks = Arc::new(ForkSet::new(n));
        let strategy = (self.factory)(&self.config, Arc::clone(&forks), &self.seats)?;
        let monitor = ExclusionMonitor::new(n);
        let start = StartLine::new(n);

        info!(
            strategy = %strategy.kind(),
            philosophers = n,
            hunger = self.config.hunger,
            "dinner starts"
        );
        let started = Instant::now();

        let table = Table {
            config:   &self.config,
            forks:    &forks,
            strategy: strategy.as_ref(),
            monitor:  &monitor,
            recorder,
            observer: self.observer.as_ref(),
            start:    &start,
        };

        let outcomes = thread::scope(|scope| -> SimResult<Vec<SimResult<SeatSummary>>> {
            let table = &table;
            let mut handles = Vec::with_capacity(n);
            for seat in &self.seats {
                let spawned = thread::Builder::new()
                    .name(format!("seat-{}", seat.name))
                    .spawn_scoped(scope, move || seat_loop(table, seat));
                match spawned {
                    Ok(handle) => handles.push((seat.id, handle)),
                    Err(e) => {
                        error!(philosopher = %seat, error = %e, "could not seat philosopher, calling the dinner off");
                        table.start.abort();
                        for (_, handle) in handles {
                            let _ = handle.join();
                        }
                        return Err(SimError::Spawn(e));
                    }
                }
            }
            Ok(handles
                .into_iter()
                .map(|(agent, handle)| handle.join().unwrap_or_else(|_| Err(SimError::AgentPanicked(agent))))
                .collect())
        })?;
        let elapsed = started.elapsed();

        // ── Join results ──────────────────────────────────────────────────
        let mut summaries = Vec::with_capacity(n);
        let mut first_error = None;
        for outcome in outcomes {
            match outcome {
                Ok(summary) => summaries.push(summary),
                Err(e @ SimError::AgentPanicked(_)) => return Err(e),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        // ── Audit ─────────────────────────────────────────────────────────
        let violations = monitor.violations()?;
        if let Some(&first) = violations.first() {
            return Err(SimError::Exclusion { first, total: violations.len() });
        }

        let ledger = forks.ledger()?;
        if let Some(bad) = ledger.iter().find(|entry| !entry.is_balanced()) {
            warn!(fork = %bad.fork, acquired = bad.acquired, released = bad.released, "fork not conserved");
            return Err(SimError::Conservation {
                fork:     bad.fork,
                acquired: bad.acquired,
                released: bad.released,
                holder:   bad.holder,
            });
        }

        let order = recorder.snapshot()?;
        if order.len() != n {
            return Err(SimError::Incomplete { expected: n, got: order.len() });
        }

        let report = RunReport {
            strategy: strategy.kind(),
            seats: self.seats.clone(),
            order,
            elapsed,
            summaries,
            ledger,
            strategy_stats: strategy.stats(),
        };

        info!(
            strategy = %report.strategy,
            ?elapsed,
            meals = report.total_meals(),
            order = ?report.completion_order(),
            "dinner over"
        );
        self.observer.on_dinner_end(&report);
        Ok(report)
    }

    /// [`run`](Self::run) on a supervisor thread, giving up after `timeout`.
    ///
    /// A run that does not finish in time is reported as
    /// [`SimError::Deadlock`].  Its threads cannot be stopped and are left
    /// blocked; the process reclaims them on exit.
    pub fn run_with_timeout(&self, timeout: Duration) -> SimResult<RunReport> {
        let (tx, rx) = bounded(1);
        let dinner = self.clone();
        thread::Builder::new()
            .name(format!("dinner-{}", self.config.strategy))
            .spawn(move || {
                let _ = tx.send(dinner.run());
            })?;

        match rx.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                error!(strategy = %self.config.strategy, ?timeout, "dinner did not finish in time");
                Err(SimError::Deadlock { strategy: self.config.strategy, timeout })
            }
            Err(RecvTimeoutError::Disconnected) => Err(SimError::Aborted),
        }
    }
}

/// One philosopher's life at the table.
fn seat_loop(table: &Table<'_>, seat: &Seat) -> SimResult<SeatSummary> {
    let config = table.config;
    let mut rng = AgentRng::new(config.seed, seat.id);
    let mut summary = SeatSummary::new(seat);

    let guard = AbortOnUnwind::new(table.start);
    table.observer.on_phase(seat, Phase::Seated);
    if !guard.arrive()? {
        return Err(SimError::Aborted);
    }

    for meal in 1..=config.hunger {
        table.observer.on_phase(seat, Phase::Thinking);
        debug!(philosopher = %seat, meal, "thinking");
        pause(rng.jittered(config.think, config.jitter));

        table.observer.on_phase(seat, Phase::Acquiring);
        let asked = Instant::now();
        let held = dine(table.strategy, seat)?;
        let waited = asked.elapsed();
        debug!(philosopher = %seat, left = %seat.left, right = %seat.right, ?waited, "picks up both forks");

        table.observer.on_phase(seat, Phase::Using);
        table.monitor.enter(seat, table.forks)?;
        pause(rng.jittered(config.eat, config.jitter));
        table.monitor.leave(seat)?;

        table.observer.on_phase(seat, Phase::Releasing);
        held.release()?;
        debug!(philosopher = %seat, meal, "puts both forks down");

        summary.record_meal(waited);
        table.observer.on_meal(seat, meal, waited);
    }

    let position = table.recorder.record(seat.id)?;
    table.observer.on_phase(seat, Phase::Finished);
    table.observer.on_finished(seat, position);
    debug!(philosopher = %seat, position, "leaves the table");
    Ok(summary)
}

/// Sleep for `d`; a zero duration still yields so seats interleave.
fn pause(d: Duration) {
    if d.is_zero() {
        thread::yield_now();
    } else {
        thread::sleep(d);
    }
}

// ── Free-function entry points ────────────────────────────────────────────────

/// Build and run a dinner from `config` with default names and no observer.
pub fn run_dinner(config: &DinnerConfig) -> SimResult<RunReport> {
    DinnerBuilder::new(config.clone()).build()?.run()
}

/// [`run_dinner`] with a wall-clock limit; see [`Dinner::run_with_timeout`].
pub fn run_with_timeout(config: &DinnerConfig, timeout: Duration) -> SimResult<RunReport> {
    DinnerBuilder::new(config.clone()).build()?.run_with_timeout(timeout)
}

/// Seat `agents` philosophers, feed each `hunger` meals, and return their
/// names in the order they left the table.
pub fn run(
    strategy: StrategyKind,
    agents:   usize,
    hunger:   u32,
    think:    Duration,
    eat:      Duration,
) -> SimResult<Vec<String>> {
    let config = DinnerConfig { agents, hunger, think, eat, strategy, ..DinnerConfig::default() };
    let report = run_dinner(&config)?;
    Ok(report.completion_order().into_iter().map(str::to_owned).collect())
}
