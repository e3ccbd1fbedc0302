//! ReplayLab Core: bar-by-bar backtest simulation and performance metrics.
//!
//! This crate contains the heart of the backtesting engine:
//! - Domain types (bars, positions, trades, equity snapshots) and series validation
//! - The strategy contract and a set of reference strategies
//! - Technical indicators used by those strategies
//! - The simulation engine: one long-or-flat position, commission on fills
//! - The metrics calculator: a pure function from run output to a report
//!
//! Nothing here performs I/O or keeps state between runs.

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod metrics;
pub mod strategy;

pub use domain::{Bar, EquitySnapshot, ExitReason, Position, SeriesError, Trade};
pub use engine::{Backtester, ConfigError, EngineConfig, EngineError, RunResult};
pub use metrics::{MetricValue, MetricsConfig, PerformanceReport};
pub use strategy::{Signal, Strategy};
