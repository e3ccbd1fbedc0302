//! Technical indicators used by the reference strategies.
//!
//! Every indicator is a pure function over a value slice that returns one
//! output per input, with `NaN` wherever the lookback window is not yet full.
//! Output at index `t` depends only on inputs `0..=t`, so computing on a
//! prefix of a series yields a prefix of the full-series output.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use bollinger::{bollinger_bands, BollingerBands};
pub use ema::ema;
pub use macd::{macd, Macd};
pub use rsi::rsi;
pub use sma::{rolling_max, rolling_min, rolling_std, sma};
pub use stochastic::{stochastic, Stochastic};

/// Last two values of an indicator series as `(previous, current)`.
///
/// Returns `None` when the series is shorter than two values. `NaN` entries
/// are returned as-is; comparisons against them are false.
pub fn last_pair(values: &[f64]) -> Option<(f64, f64)> {
    match values {
        [.., prev, curr] => Some((*prev, *curr)),
        _ => None,
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
