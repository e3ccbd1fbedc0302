//! Series validation: the boundary check run before any simulation state exists.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::Bar;

/// Reasons a price series is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("price series is empty")]
    Empty,
    #[error("timestamps must be strictly increasing: bar {index} at {current} follows {previous}")]
    NonMonotonic {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
    #[error("bar {index} has unusable close price {close}")]
    InvalidPrice { index: usize, close: f64 },
}

/// Check that a series is non-empty, strictly increasing in time, and has a
/// finite positive close on every bar.
///
/// Returns the first violation found, scanning in series order.
pub fn validate_series(bars: &[Bar]) -> Result<(), SeriesError> {
    if bars.is_empty() {
        return Err(SeriesError::Empty);
    }

    for (index, bar) in bars.iter().enumerate() {
        if !bar.close.is_finite() || bar.close <= 0.0 {
            return Err(SeriesError::InvalidPrice {
                index,
                close: bar.close,
            });
        }
        if index > 0 {
            let previous = bars[index - 1].timestamp;
            if bar.timestamp <= previous {
                return Err(SeriesError::NonMonotonic {
                    index,
                    previous,
                    current: bar.timestamp,
                });
            }
        }
    }

    Ok(())
}
