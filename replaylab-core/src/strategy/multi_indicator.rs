//! Multi-indicator confirmation strategy.
//!
//! Entry needs RSI below 40 plus either a bullish MACD histogram flip or a
//! bullish EMA(9)/EMA(21) alignment. Any one bearish reading exits:
//! RSI above 60, a bearish histogram flip, or EMA(9) below EMA(21).

use crate::domain::{closes, Bar, Position};
use crate::indicators::{ema, last_pair, macd, rsi};
use crate::strategy::{Signal, Strategy};

const WARMUP: usize = 50;
const RSI_PERIOD: usize = 14;
const RSI_ENTRY: f64 = 40.0;
const RSI_EXIT: f64 = 60.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct MultiIndicator;

impl Strategy for MultiIndicator {
    fn name(&self) -> &str {
        "multi_indicator"
    }

    fn lookback(&self) -> usize {
        WARMUP
    }

    fn decide(&self, bars: &[Bar], index: usize, position: Option<&Position>) -> Signal {
        if index < WARMUP {
            return Signal::Hold;
        }

        let values = closes(bars);
        let current_rsi = rsi(&values, RSI_PERIOD)[index];
        let histogram = macd(&values, 12, 26, 9).histogram;
        let Some((prev_hist, curr_hist)) = last_pair(&histogram) else {
            return Signal::Hold;
        };
        let ema_short = ema(&values, 9)[index];
        let ema_long = ema(&values, 21)[index];

        match position {
            None => {
                let rsi_bullish = current_rsi < RSI_ENTRY;
                let macd_bullish = curr_hist > 0.0 && prev_hist < 0.0;
                let ema_bullish = ema_short > ema_long;
                if rsi_bullish && (macd_bullish || ema_bullish) {
                    Signal::Buy
                } else {
                    Signal::Hold
                }
            }
            Some(_) => {
                let rsi_bearish = current_rsi > RSI_EXIT;
                let macd_bearish = curr_hist < 0.0 && prev_hist > 0.0;
                let ema_bearish = ema_short < ema_long;
                if rsi_bearish || macd_bearish || ema_bearish {
                    Signal::Sell
                } else {
                    Signal::Hold
                }
            }
        }
    }
}
