//! table: every allocation strategy at the same table, side by side.
//!
//! ```text
//! table [agents] [hunger] [strategy|all] [output-dir]
//! ```
//!
//! Defaults seat the classic five for three meals each with a little think
//! and eat time, run all six strategies, and print how long each took and
//! how evenly the waiting was spread.  With an output directory, per-meal
//! CSV logs for each strategy land in `<output-dir>/<strategy>/`.
//! Set `RUST_LOG=dp_sim=debug` to watch the philosophers narrate.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dp_core::{DinnerConfig, RawDinnerConfig, StrategyKind};
use dp_output::{CsvWriter, DinnerOutputObserver};
use dp_sim::{DinnerBuilder, DinnerObserver, RunReport};

// ── Constants ─────────────────────────────────────────────────────────────────

const AGENTS:    i64 = 5;
const HUNGER:    i64 = 3;
const THINK_MS:  i64 = 1;
const EAT_MS:    i64 = 2;
const JITTER_MS: i64 = 2;
const SEED:      u64 = 42;
const TIMEOUT:   Duration = Duration::from_secs(30);

// ── Arguments ─────────────────────────────────────────────────────────────────

struct Args {
    raw:        RawDinnerConfig,
    strategies: Vec<StrategyKind>,
    output:     Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() > 4 {
        bail!("usage: table [agents] [hunger] [strategy|all] [output-dir]");
    }

    let agents = match args.first() {
        Some(s) => s.parse().with_context(|| format!("agents must be an integer, got `{s}`"))?,
        None => AGENTS,
    };
    let hunger = match args.get(1) {
        Some(s) => s.parse().with_context(|| format!("hunger must be an integer, got `{s}`"))?,
        None => HUNGER,
    };
    let strategies = match args.get(2).map(String::as_str) {
        None | Some("all") => StrategyKind::ALL.to_vec(),
        Some(name) => vec![name.parse()?],
    };

    let raw = RawDinnerConfig {
        agents,
        hunger,
        think_ms:  THINK_MS,
        eat_ms:    EAT_MS,
        jitter_ms: JITTER_MS,
        seed:      SEED,
        ..RawDinnerConfig::default()
    };
    Ok(Args { raw, strategies, output: args.get(3).map(PathBuf::from) })
}

// ── One strategy ──────────────────────────────────────────────────────────────

fn dine(config: DinnerConfig, output: Option<&Path>) -> Result<RunReport> {
    let mut builder = DinnerBuilder::new(config.clone());

    let logger = match output {
        Some(root) => {
            let dir = root.join(config.strategy.as_str());
            fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
            let logger = Arc::new(DinnerOutputObserver::new(CsvWriter::new(&dir)?));
            builder = builder.observer(Arc::clone(&logger) as Arc<dyn DinnerObserver>);
            Some(logger)
        }
        None => None,
    };

    let report = builder
        .build()?
        .run_with_timeout(TIMEOUT)
        .with_context(|| format!("{} dinner failed", config.strategy))?;

    if let Some(logger) = logger {
        if let Some(e) = logger.take_error() {
            eprintln!("output error ({}): {e}", config.strategy);
        }
    }
    Ok(report)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = parse_args()?;
    let base = DinnerConfig::try_from(&args.raw)?;

    println!("=== table: dining philosophers ===");
    println!(
        "Philosophers: {}  |  Meals each: {}  |  Think/eat: {:?}/{:?} (+ up to {:?})  |  Seed: {}",
        base.agents, base.hunger, base.think, base.eat, base.jitter, base.seed
    );
    println!();

    let mut reports = Vec::with_capacity(args.strategies.len());
    for (step, &strategy) in args.strategies.iter().enumerate() {
        println!("[{}/{}] {strategy}...", step + 1, args.strategies.len());
        let config = DinnerConfig { strategy, ..base.clone() };
        let report = dine(config, args.output.as_deref())?;
        info!(%strategy, order = ?report.completion_order(), "finished");
        reports.push(report);
    }
    println!();

    // ── Summary ───────────────────────────────────────────────────────────
    println!(
        "{:<16} {:>10} {:>8} {:>14} {:>14} {:>14}  {}",
        "Strategy", "Elapsed", "Meals", "Mean wait", "Worst seat", "Longest wait", "First to leave"
    );
    println!("{}", "-".repeat(99));
    for report in &reports {
        let longest = report.summaries.iter().map(|s| s.longest_wait).max().unwrap_or_default();
        println!(
            "{:<16} {:>8.1}ms {:>8} {:>12.1}us {:>12.1}us {:>12.1}us  {}",
            report.strategy.as_str(),
            report.elapsed.as_secs_f64() * 1e3,
            report.total_meals(),
            report.mean_wait().as_secs_f64() * 1e6,
            report.worst_mean_wait().as_secs_f64() * 1e6,
            longest.as_secs_f64() * 1e6,
            report.completion_order().first().copied().unwrap_or("-"),
        );
        if let Some(peak) = report.strategy_stats.peak_admitted {
            println!("{:<16} peak admitted: {peak}", "");
        }
        if report.strategy_stats.denials > 0 {
            println!("{:<16} arbiter denials: {}", "", report.strategy_stats.denials);
        }
    }

    if let Some(dir) = &args.output {
        println!();
        println!("Run logs written under {}", dir.display());
    }
    Ok(())
}
