//! Moving average crossover strategies.
//!
//! Classic trend-following entries:
//! - Buy when the short average crosses above the long average (golden cross)
//! - Sell when the short average crosses below the long average (death cross)
//!
//! Both hold until the long average has `long` bars of history.

use crate::domain::{closes, Bar, Position};
use crate::indicators::{ema, last_pair, sma};
use crate::strategy::{
    crossed_above, crossed_below, require_order, require_period, Signal, Strategy, StrategyError,
};

/// Simple moving average crossover.
///
/// # Parameters
/// - `short`: fast SMA period (default 20)
/// - `long`: slow SMA period (default 50)
#[derive(Debug, Clone)]
pub struct SmaCrossover {
    short: usize,
    long: usize,
    name: String,
}

impl SmaCrossover {
    pub fn new(short: usize, long: usize) -> Result<Self, StrategyError> {
        require_period("sma_crossover", "short", short, 1)?;
        require_order("sma_crossover", ("short", short), ("long", long))?;
        Ok(Self {
            short,
            long,
            name: format!("sma_crossover_{short}_{long}"),
        })
    }
}

impl Default for SmaCrossover {
    fn default() -> Self {
        Self {
            short: 20,
            long: 50,
            name: "sma_crossover_20_50".into(),
        }
    }
}

impl Strategy for SmaCrossover {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.long
    }

    fn decide(&self, bars: &[Bar], index: usize, position: Option<&Position>) -> Signal {
        if index < self.long {
            return Signal::Hold;
        }

        // An SMA only depends on its own window: the last long+1 closes cover
        // both the current and the previous long average.
        let tail = &bars[bars.len() - (self.long + 1)..];
        let values = closes(tail);
        let (Some(fast), Some(slow)) = (
            last_pair(&sma(&values, self.short)),
            last_pair(&sma(&values, self.long)),
        ) else {
            return Signal::Hold;
        };

        cross_signal(fast, slow, position)
    }
}

/// Exponential moving average crossover.
///
/// # Parameters
/// - `short`: fast EMA span (default 9)
/// - `long`: slow EMA span (default 21)
#[derive(Debug, Clone)]
pub struct EmaCrossover {
    short: usize,
    long: usize,
    name: String,
}

impl EmaCrossover {
    pub fn new(short: usize, long: usize) -> Result<Self, StrategyError> {
        require_period("ema_crossover", "short", short, 1)?;
        require_order("ema_crossover", ("short", short), ("long", long))?;
        Ok(Self {
            short,
            long,
            name: format!("ema_crossover_{short}_{long}"),
        })
    }
}

impl Default for EmaCrossover {
    fn default() -> Self {
        Self {
            short: 9,
            long: 21,
            name: "ema_crossover_9_21".into(),
        }
    }
}

impl Strategy for EmaCrossover {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.long
    }

    fn decide(&self, bars: &[Bar], index: usize, position: Option<&Position>) -> Signal {
        if index < self.long {
            return Signal::Hold;
        }

        // EMAs are seeded from the first bar, so they need the whole prefix.
        let values = closes(bars);
        let (Some(fast), Some(slow)) = (
            last_pair(&ema(&values, self.short)),
            last_pair(&ema(&values, self.long)),
        ) else {
            return Signal::Hold;
        };

        cross_signal(fast, slow, position)
    }
}

fn cross_signal(fast: (f64, f64), slow: (f64, f64), position: Option<&Position>) -> Signal {
    match position {
        None if crossed_above(fast, slow) => Signal::Buy,
        Some(_) if crossed_below(fast, slow) => Signal::Sell,
        _ => Signal::Hold,
    }
}
