//! Strategy contract: the per-bar decision function consumed by the engine.
//!
//! A strategy sees only the series prefix ending at the current bar; the
//! engine slices the series before calling `decide`, so look-ahead is
//! impossible regardless of how a strategy is written.

pub mod bollinger;
pub mod buy_and_hold;
pub mod crossover;
pub mod macd;
pub mod multi_indicator;
pub mod rsi;
pub mod stochastic;

pub use bollinger::BollingerReversion;
pub use buy_and_hold::BuyAndHold;
pub use crossover::{EmaCrossover, SmaCrossover};
pub use macd::MacdCrossover;
pub use multi_indicator::MultiIndicator;
pub use rsi::RsiReversal;
pub use stochastic::StochasticCross;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Bar, Position};

/// Decision emitted once per bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Open a long position. No-op while already holding.
    Buy,
    /// Close the open position. No-op while flat.
    Sell,
    Hold,
}

/// A pluggable trading strategy.
///
/// # Invariants
/// - `decide()` receives `bars` with `bars.len() == index + 1`
/// - `decide()` MUST be deterministic for the same (bars, index, position)
/// - `decide()` has no side effects; the engine relies on this for reproducible runs
pub trait Strategy: Send + Sync {
    /// Strategy name for reports and logging.
    fn name(&self) -> &str;

    /// Decide what to do at bar `index` given the prefix `bars[..=index]`
    /// and the currently open position, if any.
    fn decide(&self, bars: &[Bar], index: usize, position: Option<&Position>) -> Signal;

    /// Number of leading bars on which the strategy always holds.
    fn lookback(&self) -> usize {
        0
    }
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn decide(&self, bars: &[Bar], index: usize, position: Option<&Position>) -> Signal {
        (**self).decide(bars, index, position)
    }

    fn lookback(&self) -> usize {
        (**self).lookback()
    }
}

/// Adapter turning a plain closure into a named [`Strategy`].
pub struct FnStrategy<F> {
    name: String,
    decide: F,
}

impl<F> FnStrategy<F>
where
    F: Fn(&[Bar], usize, Option<&Position>) -> Signal + Send + Sync,
{
    pub fn new(name: impl Into<String>, decide: F) -> Self {
        Self {
            name: name.into(),
            decide,
        }
    }
}

impl<F> Strategy for FnStrategy<F>
where
    F: Fn(&[Bar], usize, Option<&Position>) -> Signal + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, bars: &[Bar], index: usize, position: Option<&Position>) -> Signal {
        (self.decide)(bars, index, position)
    }
}

/// Invalid strategy parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("{strategy}: {parameter} must be >= {min}, got {value}")]
    PeriodTooShort {
        strategy: &'static str,
        parameter: &'static str,
        min: usize,
        value: usize,
    },
    #[error("{strategy}: {fast} must be shorter than {slow} ({fast_value} >= {slow_value})")]
    PeriodOrder {
        strategy: &'static str,
        fast: &'static str,
        slow: &'static str,
        fast_value: usize,
        slow_value: usize,
    },
    #[error("{strategy}: {parameter} must satisfy {constraint}, got {value}")]
    OutOfRange {
        strategy: &'static str,
        parameter: &'static str,
        constraint: &'static str,
        value: f64,
    },
}

pub(crate) fn require_period(
    strategy: &'static str,
    parameter: &'static str,
    value: usize,
    min: usize,
) -> Result<(), StrategyError> {
    if value < min {
        return Err(StrategyError::PeriodTooShort {
            strategy,
            parameter,
            min,
            value,
        });
    }
    Ok(())
}

pub(crate) fn require_order(
    strategy: &'static str,
    (fast, fast_value): (&'static str, usize),
    (slow, slow_value): (&'static str, usize),
) -> Result<(), StrategyError> {
    if fast_value >= slow_value {
        return Err(StrategyError::PeriodOrder {
            strategy,
            fast,
            slow,
            fast_value,
            slow_value,
        });
    }
    Ok(())
}

/// Cross of `fast` above `slow` between the previous and current bar.
pub(crate) fn crossed_above(fast: (f64, f64), slow: (f64, f64)) -> bool {
    fast.0 <= slow.0 && fast.1 > slow.1
}

/// Cross of `fast` below `slow` between the previous and current bar.
pub(crate) fn crossed_below(fast: (f64, f64), slow: (f64, f64)) -> bool {
    fast.0 >= slow.0 && fast.1 < slow.1
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::{Bar, Position};
    use chrono::{Duration, TimeZone, Utc};

    /// Daily bars from close prices, with a +/-1 high/low band.
    pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let open = if i == 0 { close } else { closes[i - 1] };
                Bar::new(
                    start + Duration::days(i as i64),
                    open,
                    open.max(close) + 1.0,
                    open.min(close) - 1.0,
                    close,
                    1000.0,
                )
            })
            .collect()
    }

    pub fn long_position(bars: &[Bar]) -> Position {
        Position::open(0, bars[0].timestamp, bars[0].close, 1.0, 0.0)
    }
}
