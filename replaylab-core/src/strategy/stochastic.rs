//! Stochastic oscillator crossover.
//!
//! - Buy when %K crosses above %D while %K is in oversold territory
//! - Sell when %K crosses below %D while %K is in overbought territory

use crate::domain::{Bar, Position};
use crate::indicators::{last_pair, stochastic};
use crate::strategy::{
    crossed_above, crossed_below, require_period, Signal, Strategy, StrategyError,
};

#[derive(Debug, Clone)]
pub struct StochasticCross {
    k_period: usize,
    d_period: usize,
    overbought: f64,
    oversold: f64,
    name: String,
}

impl StochasticCross {
    pub fn new(
        k_period: usize,
        d_period: usize,
        overbought: f64,
        oversold: f64,
    ) -> Result<Self, StrategyError> {
        require_period("stochastic_cross", "k_period", k_period, 1)?;
        require_period("stochastic_cross", "d_period", d_period, 1)?;
        if !(oversold > 0.0 && oversold < overbought && overbought < 100.0) {
            return Err(StrategyError::OutOfRange {
                strategy: "stochastic_cross",
                parameter: "oversold",
                constraint: "0 < oversold < overbought < 100",
                value: oversold,
            });
        }
        Ok(Self {
            k_period,
            d_period,
            overbought,
            oversold,
            name: format!("stochastic_cross_{k_period}_{d_period}"),
        })
    }
}

impl Default for StochasticCross {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
            overbought: 80.0,
            oversold: 20.0,
            name: "stochastic_cross_14_3".into(),
        }
    }
}

impl Strategy for StochasticCross {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.k_period + self.d_period
    }

    fn decide(&self, bars: &[Bar], index: usize, position: Option<&Position>) -> Signal {
        if index < self.lookback() {
            return Signal::Hold;
        }

        let tail = &bars[bars.len() - (self.k_period + self.d_period)..];
        let highs: Vec<f64> = tail.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = tail.iter().map(|b| b.low).collect();
        let closes: Vec<f64> = tail.iter().map(|b| b.close).collect();
        let s = stochastic(&highs, &lows, &closes, self.k_period, self.d_period);

        let (Some(k), Some(d)) = (last_pair(&s.k), last_pair(&s.d)) else {
            return Signal::Hold;
        };

        match position {
            None if k.1 < self.oversold && crossed_above(k, d) => Signal::Buy,
            Some(_) if k.1 > self.overbought && crossed_below(k, d) => Signal::Sell,
            _ => Signal::Hold,
        }
    }
}
