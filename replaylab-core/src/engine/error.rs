use thiserror::Error;

use super::config::ConfigError;
use crate::domain::SeriesError;

/// Errors that stop a run before it starts.
///
/// A run that starts always finishes; nothing fails mid-series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid series: {0}")]
    InvalidSeries(#[from] SeriesError),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
}
