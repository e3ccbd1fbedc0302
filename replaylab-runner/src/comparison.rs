//! Strategy comparison: run several strategies over one series.
//!
//! Each entry gets its own engine state, so entries run independently and
//! (by default) in parallel on the rayon pool. Results keep configuration order.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use replaylab_core::domain::Bar;
use replaylab_core::strategy::Strategy;

use crate::config::{BacktestConfig, RunId};
use crate::runner::{run_backtest, BacktestResult, RunError};

/// Results of every runnable strategy in a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub run_id: RunId,
    /// In configuration order.
    pub results: Vec<BacktestResult>,
}

/// One line of the comparison summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub strategy: String,
    pub total_return: f64,
    pub trades: usize,
    pub win_rate: f64,
}

impl Comparison {
    /// Entry with the highest total return; ties go to the earlier entry.
    pub fn best(&self) -> Option<&BacktestResult> {
        self.results.iter().fold(None, |best, r| match best {
            Some(b) if b.total_return() >= r.total_return() => Some(b),
            _ => Some(r),
        })
    }

    pub fn rows(&self) -> Vec<ComparisonRow> {
        self.results
            .iter()
            .map(|r| ComparisonRow {
                strategy: r.strategy.clone(),
                total_return: r.report.total_return,
                trades: r.report.total_trades,
                win_rate: r.report.win_rate,
            })
            .collect()
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<30} {:>10} {:>8} {:>10}",
            "Strategy", "Return", "Trades", "Win Rate"
        )?;
        writeln!(f, "{}", "-".repeat(61))?;
        for row in self.rows() {
            writeln!(
                f,
                "{:<30} {:>9.2}% {:>8} {:>9.1}%",
                row.strategy,
                row.total_return * 100.0,
                row.trades,
                row.win_rate * 100.0
            )?;
        }
        Ok(())
    }
}

/// Run every strategy in `config` over `bars`.
///
/// Entries with invalid parameters are logged and skipped. Fails if no
/// entry is runnable, or if the engine rejects the series or settings.
pub fn compare_strategies(bars: &[Bar], config: &BacktestConfig) -> Result<Comparison, RunError> {
    let engine = config.engine_config()?;
    let metrics = config.metrics_config()?;
    let run_id = config.run_id()?;

    let strategies: Vec<Box<dyn Strategy>> = config
        .strategy_list()
        .iter()
        .filter_map(|preset| match preset.build() {
            Ok(strategy) => Some(strategy),
            Err(e) => {
                warn!(?preset, error = %e, "skipping strategy");
                None
            }
        })
        .collect();

    if strategies.is_empty() {
        return Err(RunError::NoStrategies);
    }

    info!(
        run_id = %run_id,
        strategies = strategies.len(),
        bars = bars.len(),
        parallel = config.parallel,
        "comparison started"
    );

    let run = |strategy: &dyn Strategy| run_backtest(bars, strategy, &engine, &metrics);
    let results: Vec<BacktestResult> = if config.parallel {
        strategies
            .par_iter()
            .map(|s| run(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        strategies
            .iter()
            .map(|s| run(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?
    };

    let comparison = Comparison { run_id, results };
    if let Some(best) = comparison.best() {
        info!(
            best = %best.strategy,
            total_return = best.total_return(),
            "comparison finished"
        );
    }
    Ok(comparison)
}
