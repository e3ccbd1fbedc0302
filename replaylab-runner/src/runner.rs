//! Backtest runner: wires together the engine and the metrics calculator.
//!
//! Two entry points:
//! - `run_backtest()`: one strategy over pre-loaded bars with explicit settings.
//! - `run_from_config()`: same, with settings taken from a [`BacktestConfig`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use replaylab_core::domain::{Bar, EquitySnapshot, Trade};
use replaylab_core::engine::{Backtester, EngineConfig, EngineError};
use replaylab_core::metrics::{MetricsConfig, PerformanceReport};
use replaylab_core::strategy::Strategy;

use crate::config::{BacktestConfig, ConfigFileError};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("config error: {0}")]
    Config(#[from] ConfigFileError),
    #[error("no runnable strategies in configuration")]
    NoStrategies,
}

/// Current schema version for serialized results.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub strategy: String,
    pub bar_count: usize,
    pub report: PerformanceReport,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquitySnapshot>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    pub fn total_return(&self) -> f64 {
        self.report.total_return
    }
}

/// Run one strategy over `bars` and compute its report without any I/O.
pub fn run_backtest(
    bars: &[Bar],
    strategy: &dyn Strategy,
    engine: &EngineConfig,
    metrics: &MetricsConfig,
) -> Result<BacktestResult, RunError> {
    info!(
        strategy = strategy.name(),
        bars = bars.len(),
        capital = engine.initial_capital(),
        "backtest started"
    );

    let run = Backtester::new(engine.clone()).run(bars, strategy)?;
    let report = PerformanceReport::compute(
        &run.equity_curve,
        &run.trades,
        run.initial_capital,
        metrics,
    );

    info!(
        strategy = strategy.name(),
        trades = report.total_trades,
        total_return = report.total_return,
        "backtest finished"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        strategy: strategy.name().to_string(),
        bar_count: bars.len(),
        report,
        trades: run.trades,
        equity_curve: run.equity_curve,
    })
}

/// Run one strategy with engine and metrics settings from `config`.
pub fn run_from_config(
    bars: &[Bar],
    strategy: &dyn Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, RunError> {
    let engine = config.engine_config()?;
    let metrics = config.metrics_config()?;
    run_backtest(bars, strategy, &engine, &metrics)
}
