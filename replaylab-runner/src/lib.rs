//! ReplayLab Runner: configuration, single runs and strategy comparison.
//!
//! This crate builds on `replaylab-core` to provide:
//! - TOML run configuration with strategy presets
//! - Single-backtest runner that bundles trades, equity curve and report
//! - Parallel multi-strategy comparison with a summary table
//! - Deterministic synthetic price series

pub mod comparison;
pub mod config;
pub mod runner;
pub mod synthetic;

pub use comparison::{compare_strategies, Comparison, ComparisonRow};
pub use config::{BacktestConfig, ConfigFileError, RunId, StrategyConfig};
pub use runner::{run_backtest, run_from_config, BacktestResult, RunError};
pub use synthetic::synthetic_series;
