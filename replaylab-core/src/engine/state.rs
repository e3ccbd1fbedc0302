//! Engine state and run result types.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, EquitySnapshot, Position, Trade};

/// State that evolves bar-by-bar during a run.
///
/// Owned by a single run; nothing carries over between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub cash: f64,
    /// At most one open long position.
    pub position: Option<Position>,
    pub total_commission: f64,
}

impl EngineState {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            position: None,
            total_commission: 0.0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    pub fn position_value(&self, price: f64) -> f64 {
        self.position
            .as_ref()
            .map_or(0.0, |pos| pos.market_value(price))
    }

    /// Mark-to-market equity: `cash + position value at price`.
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.position_value(price)
    }

    pub(crate) fn snapshot(&self, index: usize, bar: &Bar) -> EquitySnapshot {
        let position_value = self.position_value(bar.close);
        EquitySnapshot {
            index,
            timestamp: bar.timestamp,
            equity: self.cash + position_value,
            cash: self.cash,
            position_value,
        }
    }
}

/// Result of a complete backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub initial_capital: f64,
    /// One snapshot per input bar, in series order.
    pub equity_curve: Vec<EquitySnapshot>,
    /// Completed trades in chronological order.
    pub trades: Vec<Trade>,
    /// State after the end-of-series close; always flat.
    pub final_state: EngineState,
}

impl RunResult {
    /// Equity of the last snapshot (marked at the last close).
    pub fn final_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map_or(self.initial_capital, |s| s.equity)
    }

    /// Cash after every position has been closed.
    pub fn realized_equity(&self) -> f64 {
        self.final_state.cash
    }

    /// Sum of trade net P/L in chronological order.
    pub fn net_profit(&self) -> f64 {
        self.trades.iter().map(|t| t.net_pnl).sum()
    }
}
