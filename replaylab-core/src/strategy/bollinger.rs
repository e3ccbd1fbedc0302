//! Bollinger Bands mean reversion.
//!
//! - Buy when the close touches or pierces the lower band
//! - Sell when the close touches or pierces the upper band

use crate::domain::{closes, Bar, Position};
use crate::indicators::bollinger_bands;
use crate::strategy::{require_period, Signal, Strategy, StrategyError};

#[derive(Debug, Clone)]
pub struct BollingerReversion {
    period: usize,
    std_dev: f64,
    name: String,
}

impl BollingerReversion {
    pub fn new(period: usize, std_dev: f64) -> Result<Self, StrategyError> {
        require_period("bollinger_reversion", "period", period, 2)?;
        if !(std_dev.is_finite() && std_dev > 0.0) {
            return Err(StrategyError::OutOfRange {
                strategy: "bollinger_reversion",
                parameter: "std_dev",
                constraint: "finite and > 0",
                value: std_dev,
            });
        }
        Ok(Self {
            period,
            std_dev,
            name: format!("bollinger_reversion_{period}_{std_dev}"),
        })
    }
}

impl Default for BollingerReversion {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev: 2.0,
            name: "bollinger_reversion_20_2".into(),
        }
    }
}

impl Strategy for BollingerReversion {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn decide(&self, bars: &[Bar], index: usize, position: Option<&Position>) -> Signal {
        if index < self.period {
            return Signal::Hold;
        }

        let tail = &bars[bars.len() - self.period..];
        let bands = bollinger_bands(&closes(tail), self.period, self.std_dev);
        let last = self.period - 1;
        let price = bars[index].close;

        match position {
            None if price <= bands.lower[last] => Signal::Buy,
            Some(_) if price >= bands.upper[last] => Signal::Sell,
            _ => Signal::Hold,
        }
    }
}
