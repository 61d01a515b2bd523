//! Integration tests for dp-sim.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use dp_core::{AgentId, DinnerConfig, ForkId, RawDinnerConfig, StrategyKind};
use dp_strategy::{AllocationStrategy, StrategyResult};
use dp_table::{ForkSet, PHILOSOPHERS, Seat, make_ring};

use crate::start::{AbortOnUnwind, StartLine};
use crate::{
    DinnerBuilder, DinnerObserver, ExclusionMonitor, Phase, ResultRecorder, RunReport, SeatSummary,
    SimError, run, run_dinner, run_with_timeout,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const TIMEOUT: Duration = Duration::from_secs(20);

/// Three meals each, no delays.
fn table_config(agents: usize, strategy: StrategyKind) -> DinnerConfig {
    DinnerConfig::new(agents, strategy)
}

/// Run under the hang guard and check the report against the table.
fn run_checked(config: &DinnerConfig) -> RunReport {
    let report = run_with_timeout(config, TIMEOUT)
        .unwrap_or_else(|e| panic!("{} with {} seats failed: {e}", config.strategy, config.agents));
    assert_eq!(report.order.len(), config.agents);
    let distinct: HashSet<AgentId> = report.order.iter().copied().collect();
    assert_eq!(distinct.len(), config.agents, "a philosopher finished twice");
    assert!(report.ledger.iter().all(|l| l.is_balanced()));
    assert_eq!(report.total_meals(), config.agents as u64 * u64::from(config.hunger));
    report
}

/// Takes its left fork, then the same fork again: blocks on itself forever.
struct SelfDeadlock {
    forks: Arc<ForkSet>,
}

impl AllocationStrategy for SelfDeadlock {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Asymmetric
    }

    fn acquire_both(&self, seat: &Seat) -> StrategyResult<()> {
        self.forks.acquire(seat.left, seat.id)?;
        self.forks.acquire(seat.left, seat.id)?;
        Ok(())
    }

    fn release_both(&self, seat: &Seat) -> StrategyResult<()> {
        self.forks.release(seat.left, seat.id)?;
        Ok(())
    }
}

/// Forks handed out with no exclusion at all.
struct NoLocking;

impl AllocationStrategy for NoLocking {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Asymmetric
    }

    fn acquire_both(&self, _seat: &Seat) -> StrategyResult<()> {
        Ok(())
    }

    fn release_both(&self, _seat: &Seat) -> StrategyResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct CountingObserver {
    meals:    AtomicU64,
    finished: AtomicUsize,
    phases:   Mutex<Vec<Phase>>,
    ended:    AtomicUsize,
}

impl DinnerObserver for CountingObserver {
    fn on_phase(&self, _seat: &Seat, phase: Phase) {
        self.phases.lock().unwrap().push(phase);
    }

    fn on_meal(&self, _seat: &Seat, _meal: u32, _waited: Duration) {
        self.meals.fetch_add(1, Ordering::Relaxed);
    }

    fn on_finished(&self, _seat: &Seat, _position: usize) {
        self.finished.fetch_add(1, Ordering::Relaxed);
    }

    fn on_dinner_end(&self, _report: &RunReport) {
        self.ended.fetch_add(1, Ordering::Relaxed);
    }
}

struct PanickingObserver;

impl DinnerObserver for PanickingObserver {
    fn on_meal(&self, seat: &Seat, _meal: u32, _waited: Duration) {
        if seat.id == AgentId(1) {
            panic!("observer blew up");
        }
    }
}

/// Panics for seat 1 as soon as it sits down, before the start line.
struct PanicWhenSeated;

impl DinnerObserver for PanicWhenSeated {
    fn on_phase(&self, seat: &Seat, phase: Phase) {
        if seat.id == AgentId(1) && phase == Phase::Seated {
            panic!("observer blew up at the start line");
        }
    }
}

// ── Completion across strategies and table sizes ──────────────────────────────

#[cfg(test)]
mod completion_tests {
    use super::*;

    #[test]
    fn every_strategy_finishes_repeatedly() {
        for kind in StrategyKind::ALL {
            for n in [2, 5, 10] {
                for trial in 0..10 {
                    let mut config = table_config(n, kind);
                    config.seed = trial;
                    run_checked(&config);
                }
            }
        }
    }

    #[test]
    fn kant_and_friends_finish_fast() {
        let started = std::time::Instant::now();
        let names = run(StrategyKind::Asymmetric, 5, 3, Duration::ZERO, Duration::ZERO).unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));

        assert_eq!(names.len(), 5);
        let got: HashSet<&str> = names.iter().map(String::as_str).collect();
        let want: HashSet<&str> = PHILOSOPHERS.into_iter().collect();
        assert_eq!(got, want);
    }

    #[test]
    fn repeated_runs_are_independent() {
        let dinner = DinnerBuilder::new(table_config(5, StrategyKind::PairLock)).build().unwrap();
        for _ in 0..5 {
            let report = dinner.run().unwrap();
            assert_eq!(report.order.len(), 5);
        }
    }

    #[test]
    fn zero_hunger_still_records_everyone() {
        let mut config = table_config(4, StrategyKind::Arbiter);
        config.hunger = 0;
        let report = run_checked(&config);
        assert!(report.ledger.iter().all(|l| l.acquired == 0));
        assert!(report.summaries.iter().all(|s| s.meals == 0));
    }

    #[test]
    fn custom_names_are_reported() {
        let names: Vec<String> = ["Arendt", "Beauvoir", "Spinoza"].into_iter().map(String::from).collect();
        let report = DinnerBuilder::new(table_config(3, StrategyKind::MessagePassing))
            .names(names.clone())
            .build()
            .unwrap()
            .run_with_timeout(TIMEOUT)
            .unwrap();
        let mut order: Vec<String> = report.completion_order().into_iter().map(String::from).collect();
        order.sort();
        assert_eq!(order, names);
    }
}

// ── Adversarial timing ────────────────────────────────────────────────────────

#[cfg(test)]
mod timing_tests {
    use super::*;

    #[test]
    fn jittered_durations() {
        for kind in StrategyKind::ALL {
            for seed in 0..3 {
                let config = DinnerConfig {
                    agents: 5,
                    hunger: 4,
                    think: Duration::from_micros(50),
                    eat: Duration::from_micros(50),
                    jitter: Duration::from_micros(300),
                    strategy: kind,
                    seed,
                    ..DinnerConfig::default()
                };
                run_checked(&config);
            }
        }
    }

    #[test]
    fn long_meals_short_thoughts() {
        for kind in StrategyKind::ALL {
            let config = DinnerConfig {
                agents: 6,
                hunger: 3,
                think: Duration::ZERO,
                eat: Duration::from_millis(2),
                strategy: kind,
                ..DinnerConfig::default()
            };
            run_checked(&config);
        }
    }

    #[test]
    fn long_thoughts_short_meals() {
        for kind in StrategyKind::ALL {
            let config = DinnerConfig {
                agents: 6,
                hunger: 3,
                think: Duration::from_millis(2),
                eat: Duration::ZERO,
                strategy: kind,
                ..DinnerConfig::default()
            };
            run_checked(&config);
        }
    }

    #[test]
    fn waits_are_measured() {
        let config = DinnerConfig {
            agents: 2,
            hunger: 5,
            eat: Duration::from_millis(2),
            strategy: StrategyKind::Hierarchy,
            ..DinnerConfig::default()
        };
        let report = run_checked(&config);
        // Two seats share both forks, so someone must have waited.
        assert!(report.summaries.iter().any(|s| s.longest_wait > Duration::ZERO));
        assert!(report.summaries.iter().all(|s| s.total_wait >= s.longest_wait));
    }
}

// ── Strategy statistics ───────────────────────────────────────────────────────

#[cfg(test)]
mod stats_tests {
    use super::*;

    #[test]
    fn admission_peak_never_exceeds_limit() {
        for n in [2, 5, 10] {
            let mut config = table_config(n, StrategyKind::AdmissionLimit);
            config.eat = Duration::from_micros(200);
            let report = run_checked(&config);
            let peak = report.strategy_stats.peak_admitted.unwrap();
            assert!(peak >= 1 && peak <= n - 1, "peak {peak} with {n} seats");
        }
    }

    #[test]
    fn smaller_admission_limit_is_honoured() {
        let mut config = table_config(6, StrategyKind::AdmissionLimit);
        config.admission_limit = Some(2);
        config.eat = Duration::from_micros(200);
        let report = run_checked(&config);
        assert!(report.strategy_stats.peak_admitted.unwrap() <= 2);
    }

    #[test]
    fn arbiter_grants_every_meal() {
        let report = run_checked(&table_config(5, StrategyKind::Arbiter));
        assert_eq!(report.strategy_stats.grants, 15);
    }

    #[test]
    fn seat_mean_wait() {
        let seats = make_ring(2).unwrap();
        let mut summary = SeatSummary::new(&seats[0]);
        assert_eq!(summary.mean_wait(), Duration::ZERO);
        summary.record_meal(Duration::from_micros(100));
        summary.record_meal(Duration::from_micros(300));
        assert_eq!(summary.mean_wait(), Duration::from_micros(200));
        assert_eq!(summary.longest_wait, Duration::from_micros(300));
    }

    #[test]
    fn report_wait_means_are_consistent() {
        let config = DinnerConfig {
            agents: 3,
            hunger: 4,
            eat: Duration::from_micros(500),
            strategy: StrategyKind::PairLock,
            ..DinnerConfig::default()
        };
        let report = run_checked(&config);
        let longest = report.summaries.iter().map(|s| s.longest_wait).max().unwrap();
        assert!(report.mean_wait() <= report.worst_mean_wait());
        assert!(report.worst_mean_wait() <= longest);

        let total: Duration = report.summaries.iter().map(|s| s.total_wait).sum();
        assert_eq!(report.mean_wait(), total / 12);
    }

    #[test]
    fn no_meals_means_no_wait() {
        let mut config = table_config(3, StrategyKind::Asymmetric);
        config.hunger = 0;
        let report = run_checked(&config);
        assert_eq!(report.mean_wait(), Duration::ZERO);
        assert_eq!(report.worst_mean_wait(), Duration::ZERO);
    }
}

// ── Configuration errors ──────────────────────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn single_philosopher_is_rejected() {
        let err = run_dinner(&DinnerConfig::new(1, StrategyKind::Asymmetric)).unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn admission_limit_of_n_is_rejected() {
        let mut config = DinnerConfig::new(5, StrategyKind::AdmissionLimit);
        config.admission_limit = Some(5);
        assert!(matches!(DinnerBuilder::new(config).build(), Err(SimError::Config(_))));
    }

    #[test]
    fn name_count_mismatch_is_rejected() {
        let result = DinnerBuilder::new(DinnerConfig::new(3, StrategyKind::Hierarchy))
            .names(vec!["Kant".into(), "Hume".into()])
            .build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = DinnerBuilder::new(DinnerConfig::new(2, StrategyKind::Hierarchy))
            .names(vec!["Kant".into(), "Kant".into()])
            .build();
        assert!(matches!(result, Err(SimError::Table(_))));
    }

    #[test]
    fn raw_config_round_trip_into_a_run() {
        let raw = RawDinnerConfig {
            agents: 4,
            hunger: 2,
            strategy: "pair_lock".into(),
            ..RawDinnerConfig::default()
        };
        let config = DinnerConfig::try_from(&raw).unwrap();
        assert_eq!(config.strategy, StrategyKind::PairLock);
        run_checked(&config);
    }
}

// ── Failure detection ─────────────────────────────────────────────────────────

#[cfg(test)]
mod failure_tests {
    use super::*;

    #[test]
    fn timeout_reports_deadlock() {
        let dinner = DinnerBuilder::new(table_config(3, StrategyKind::Asymmetric))
            .strategy_factory(|_, forks, _| Ok(Arc::new(SelfDeadlock { forks }) as Arc<dyn AllocationStrategy>))
            .build()
            .unwrap();
        let err = dinner.run_with_timeout(Duration::from_millis(200)).unwrap_err();
        assert!(matches!(
            err,
            SimError::Deadlock { strategy: StrategyKind::Asymmetric, timeout } if timeout == Duration::from_millis(200)
        ));
    }

    #[test]
    fn missing_exclusion_is_caught() {
        let mut config = table_config(2, StrategyKind::Asymmetric);
        config.eat = Duration::from_micros(100);
        let dinner = DinnerBuilder::new(config)
            .strategy_factory(|_, _, _| Ok(Arc::new(NoLocking) as Arc<dyn AllocationStrategy>))
            .build()
            .unwrap();
        let err = dinner.run_with_timeout(TIMEOUT).unwrap_err();
        assert!(matches!(err, SimError::Exclusion { total, .. } if total > 0));
    }

    #[test]
    fn panicking_seat_is_reported() {
        let err = DinnerBuilder::new(table_config(3, StrategyKind::Hierarchy))
            .observer(Arc::new(PanickingObserver))
            .build()
            .unwrap()
            .run_with_timeout(TIMEOUT)
            .unwrap_err();
        assert!(matches!(err, SimError::AgentPanicked(AgentId(1))));
    }

    #[test]
    fn panic_before_start_line_is_reported() {
        let err = DinnerBuilder::new(table_config(3, StrategyKind::Hierarchy))
            .observer(Arc::new(PanicWhenSeated))
            .build()
            .unwrap()
            .run_with_timeout(Duration::from_secs(2))
            .unwrap_err();
        assert!(matches!(err, SimError::AgentPanicked(AgentId(1))), "got {err:?}");
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use super::*;

    #[test]
    fn observer_sees_every_meal_and_finish() {
        let observer = Arc::new(CountingObserver::default());
        let report = DinnerBuilder::new(table_config(4, StrategyKind::Arbiter))
            .observer(Arc::clone(&observer) as Arc<dyn DinnerObserver>)
            .build()
            .unwrap()
            .run_with_timeout(TIMEOUT)
            .unwrap();

        assert_eq!(observer.meals.load(Ordering::Relaxed), report.total_meals());
        assert_eq!(observer.finished.load(Ordering::Relaxed), 4);
        assert_eq!(observer.ended.load(Ordering::Relaxed), 1);

        let phases = observer.phases.lock().unwrap();
        assert_eq!(phases.iter().filter(|p| **p == Phase::Seated).count(), 4);
        assert_eq!(phases.iter().filter(|p| **p == Phase::Finished).count(), 4);
        assert_eq!(phases.iter().filter(|p| **p == Phase::Using).count(), 12);
    }

    #[test]
    fn phase_display() {
        assert_eq!(Phase::Acquiring.to_string(), "acquiring forks");
        assert_eq!(Phase::Using.to_string(), "eating");
    }
}

// ── Recorder ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod recorder_tests {
    use super::*;

    #[test]
    fn positions_follow_arrival() {
        let recorder = ResultRecorder::new();
        assert_eq!(recorder.record(AgentId(2)).unwrap(), 0);
        assert_eq!(recorder.record(AgentId(0)).unwrap(), 1);
        assert_eq!(recorder.snapshot().unwrap(), vec![AgentId(2), AgentId(0)]);
    }

    #[test]
    fn duplicate_finish_is_an_error() {
        let recorder = ResultRecorder::new();
        recorder.record(AgentId(1)).unwrap();
        assert!(matches!(recorder.record(AgentId(1)), Err(SimError::DuplicateFinish(AgentId(1)))));
        assert_eq!(recorder.len().unwrap(), 1);
    }

    #[test]
    fn run_clears_an_injected_recorder() {
        let recorder = ResultRecorder::new();
        recorder.record(AgentId(7)).unwrap();
        let dinner = DinnerBuilder::new(table_config(3, StrategyKind::Asymmetric)).build().unwrap();

        dinner.run_with(&recorder).unwrap();
        dinner.run_with(&recorder).unwrap();

        let order = recorder.snapshot().unwrap();
        assert_eq!(order.len(), 3);
        assert!(!order.contains(&AgentId(7)));
    }

    #[test]
    fn clear_empties() {
        let recorder = ResultRecorder::new();
        recorder.record(AgentId(0)).unwrap();
        recorder.clear().unwrap();
        assert!(recorder.is_empty().unwrap());
    }
}

// ── Exclusion monitor ─────────────────────────────────────────────────────────

#[cfg(test)]
mod monitor_tests {
    use super::*;

    #[test]
    fn forged_overlap_is_detected() {
        let seats = make_ring(3).unwrap();
        let forks = ForkSet::new(3);
        let monitor = ExclusionMonitor::new(3);

        // Seat 0 eats legitimately with forks 0 and 1.
        forks.acquire(ForkId(0), AgentId(0)).unwrap();
        forks.acquire(ForkId(1), AgentId(0)).unwrap();
        monitor.enter(&seats[0], &forks).unwrap();

        // Seat 1 (forks 1 and 2) claims to eat without fork 1.
        forks.acquire(ForkId(2), AgentId(1)).unwrap();
        monitor.enter(&seats[1], &forks).unwrap();

        let violations = monitor.violations().unwrap();
        assert!(violations.iter().any(|v| v.fork == ForkId(1) && v.agent == AgentId(1) && v.other.is_none()));
        assert!(violations.iter().any(|v| v.fork == ForkId(1) && v.other == Some(AgentId(0))));
    }

    #[test]
    fn clean_handover_is_not_a_violation() {
        let seats = make_ring(2).unwrap();
        let forks = ForkSet::new(2);
        let monitor = ExclusionMonitor::new(2);

        for seat in &seats {
            for fork in seat.forks() {
                forks.acquire(fork, seat.id).unwrap();
            }
            monitor.enter(seat, &forks).unwrap();
            monitor.leave(seat).unwrap();
            for fork in seat.forks() {
                forks.release(fork, seat.id).unwrap();
            }
        }
        assert!(monitor.violations().unwrap().is_empty());
    }

    #[test]
    fn violation_display_names_both_seats() {
        let v = crate::ExclusionViolation { fork: ForkId(1), agent: AgentId(1), other: Some(AgentId(0)) };
        assert_eq!(v.to_string(), "seat 1 ate with fork 1 while seat 0 was using it");
    }
}

// ── Start line ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod start_tests {
    use super::*;

    #[test]
    fn releases_when_everyone_arrives() {
        let line = Arc::new(StartLine::new(3));
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let line = Arc::clone(&line);
                thread::spawn(move || line.arrive_and_wait().unwrap())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    #[test]
    fn abort_releases_waiters_with_false() {
        let line = Arc::new(StartLine::new(3));
        let waiter = {
            let line = Arc::clone(&line);
            thread::spawn(move || line.arrive_and_wait().unwrap())
        };
        thread::sleep(Duration::from_millis(20));
        line.abort();
        assert!(!waiter.join().unwrap());
    }

    #[test]
    fn unwinding_before_arrival_aborts() {
        let line = Arc::new(StartLine::new(2));
        let waiter = {
            let line = Arc::clone(&line);
            thread::spawn(move || line.arrive_and_wait().unwrap())
        };
        let quitter = {
            let line = Arc::clone(&line);
            thread::spawn::<_, ()>(move || {
                let _guard = AbortOnUnwind::new(&line);
                panic!("left before arriving");
            })
        };
        assert!(quitter.join().is_err());
        assert!(!waiter.join().unwrap());
    }

    #[test]
    fn guard_arrives_normally() {
        let line = Arc::new(StartLine::new(2));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let line = Arc::clone(&line);
                thread::spawn(move || AbortOnUnwind::new(&line).arrive().unwrap())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod logging_tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn run_logs_start_and_end() {
        DinnerBuilder::new(table_config(2, StrategyKind::Hierarchy)).build().unwrap().run().unwrap();
        assert!(logs_contain("dinner starts"));
        assert!(logs_contain("dinner over"));
    }

    #[traced_test]
    #[test]
    fn timeout_is_logged() {
        let dinner = DinnerBuilder::new(table_config(2, StrategyKind::Asymmetric))
            .strategy_factory(|_, forks, _| Ok(Arc::new(SelfDeadlock { forks }) as Arc<dyn AllocationStrategy>))
            .build()
            .unwrap();
        let _ = dinner.run_with_timeout(Duration::from_millis(100));
        assert!(logs_contain("did not finish in time"));
    }
}
