//! RSI reversal strategy.
//!
//! - Buy when RSI crosses up through the oversold level
//! - Sell when RSI crosses down through the overbought level

use crate::domain::{closes, Bar, Position};
use crate::indicators::{last_pair, rsi};
use crate::strategy::{require_period, Signal, Strategy, StrategyError};

#[derive(Debug, Clone)]
pub struct RsiReversal {
    period: usize,
    oversold: f64,
    overbought: f64,
    name: String,
}

impl RsiReversal {
    pub fn new(period: usize, oversold: f64, overbought: f64) -> Result<Self, StrategyError> {
        require_period("rsi_reversal", "period", period, 1)?;
        if !(oversold > 0.0 && oversold < overbought && overbought < 100.0) {
            return Err(StrategyError::OutOfRange {
                strategy: "rsi_reversal",
                parameter: "oversold",
                constraint: "0 < oversold < overbought < 100",
                value: oversold,
            });
        }
        Ok(Self {
            period,
            oversold,
            overbought,
            name: format!("rsi_reversal_{period}"),
        })
    }
}

impl Default for RsiReversal {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
            name: "rsi_reversal_14".into(),
        }
    }
}

impl Strategy for RsiReversal {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period + 1
    }

    fn decide(&self, bars: &[Bar], index: usize, position: Option<&Position>) -> Signal {
        if index < self.period + 1 {
            return Signal::Hold;
        }

        // period changes for each of the last two values, plus the leading bar.
        let tail = &bars[bars.len() - (self.period + 2)..];
        let Some((prev, curr)) = last_pair(&rsi(&closes(tail), self.period)) else {
            return Signal::Hold;
        };

        match position {
            None if prev <= self.oversold && curr > self.oversold => Signal::Buy,
            Some(_) if prev >= self.overbought && curr < self.overbought => Signal::Sell,
            _ => Signal::Hold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::{long_position, make_bars};

    #[test]
    fn rejects_bad_thresholds() {
        assert!(RsiReversal::new(0, 30.0, 70.0).is_err());
        assert!(RsiReversal::new(14, 70.0, 30.0).is_err());
        assert!(RsiReversal::new(14, 0.0, 70.0).is_err());
        assert!(RsiReversal::new(14, 30.0, 100.0).is_err());
    }

    #[test]
    fn buys_on_recovery_from_oversold() {
        // Five losing bars push RSI to 0, then a strong gain lifts it above 30.
        let closes = [100.0, 99.0, 98.0, 97.0, 96.0, 95.0, 105.0];
        let bars = make_bars(&closes);
        let strategy = RsiReversal::new(4, 30.0, 70.0).unwrap();
        assert_eq!(strategy.decide(&bars[..6], 5, None), Signal::Hold);
        assert_eq!(strategy.decide(&bars, 6, None), Signal::Buy);
    }

    #[test]
    fn sells_on_fall_from_overbought() {
        let closes = [100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 95.0];
        let bars = make_bars(&closes);
        let strategy = RsiReversal::new(4, 30.0, 70.0).unwrap();
        let pos = long_position(&bars);
        assert_eq!(strategy.decide(&bars, 6, None), Signal::Hold);
        assert_eq!(strategy.decide(&bars, 6, Some(&pos)), Signal::Sell);
    }

    #[test]
    fn holds_during_warmup() {
        let bars = make_bars(&[100.0, 90.0, 80.0, 120.0]);
        let strategy = RsiReversal::new(4, 30.0, 70.0).unwrap();
        assert_eq!(strategy.decide(&bars, 3, None), Signal::Hold);
    }
}
