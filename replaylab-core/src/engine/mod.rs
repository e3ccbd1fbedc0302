//! Backtesting engine: configuration, state, and the bar-by-bar loop.

pub mod backtester;
pub mod config;
pub mod error;
pub mod state;

pub use backtester::Backtester;
pub use config::{CommissionLegs, ConfigError, EngineConfig, DEFAULT_POSITION_SIZE};
pub use error::EngineError;
pub use state::{EngineState, RunResult};
