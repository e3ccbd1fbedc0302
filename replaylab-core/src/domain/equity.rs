use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mark-to-market portfolio value at one bar's close.
///
/// Exactly one snapshot is produced per input bar, in series order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquitySnapshot {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    /// `cash + position_value`.
    pub equity: f64,
    pub cash: f64,
    pub position_value: f64,
}

/// Extract the equity column of an equity curve.
pub fn equity_values(curve: &[EquitySnapshot]) -> Vec<f64> {
    curve.iter().map(|s| s.equity).collect()
}
