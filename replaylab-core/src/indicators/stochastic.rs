//! Stochastic Oscillator.
//!
//! %K = 100 * (close - lowest low) / (highest high - lowest low) over `k_period`.
//! %D = SMA(%K, d_period).
//! A zero high-low range leaves %K undefined (NaN).

use super::sma::{rolling_max, rolling_min, sma};

#[derive(Debug, Clone, PartialEq)]
pub struct Stochastic {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
) -> Stochastic {
    let lowest = rolling_min(lows, k_period);
    let highest = rolling_max(highs, k_period);

    let k: Vec<f64> = closes
        .iter()
        .zip(lowest.iter().zip(&highest))
        .map(|(&c, (&lo, &hi))| {
            let range = hi - lo;
            if range.is_nan() || range == 0.0 {
                f64::NAN
            } else {
                100.0 * (c - lo) / range
            }
        })
        .collect();
    let d = sma(&k, d_period);

    Stochastic { k, d }
}
