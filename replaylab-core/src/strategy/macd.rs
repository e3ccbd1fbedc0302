//! MACD signal-line crossover.
//!
//! - Buy when the MACD line crosses above its signal line
//! - Sell when the MACD line crosses below its signal line

use crate::domain::{closes, Bar, Position};
use crate::indicators::{last_pair, macd};
use crate::strategy::{
    crossed_above, crossed_below, require_order, require_period, Signal, Strategy, StrategyError,
};

#[derive(Debug, Clone)]
pub struct MacdCrossover {
    fast: usize,
    slow: usize,
    signal: usize,
    name: String,
}

impl MacdCrossover {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self, StrategyError> {
        require_period("macd_crossover", "fast", fast, 1)?;
        require_period("macd_crossover", "signal", signal, 1)?;
        require_order("macd_crossover", ("fast", fast), ("slow", slow))?;
        Ok(Self {
            fast,
            slow,
            signal,
            name: format!("macd_crossover_{fast}_{slow}_{signal}"),
        })
    }
}

impl Default for MacdCrossover {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
            name: "macd_crossover_12_26_9".into(),
        }
    }
}

impl Strategy for MacdCrossover {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.slow + self.signal
    }

    fn decide(&self, bars: &[Bar], index: usize, position: Option<&Position>) -> Signal {
        if index < self.lookback() {
            return Signal::Hold;
        }

        let m = macd(&closes(bars), self.fast, self.slow, self.signal);
        let (Some(line), Some(signal)) = (last_pair(&m.line), last_pair(&m.signal)) else {
            return Signal::Hold;
        };

        match position {
            None if crossed_above(line, signal) => Signal::Buy,
            Some(_) if crossed_below(line, signal) => Signal::Sell,
            _ => Signal::Hold,
        }
    }
}
