use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single open long position held by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub entry_index: usize,
    pub entry_timestamp: DateTime<Utc>,
    pub entry_price: f64,
    /// Units held; fractional quantities are allowed.
    pub quantity: f64,
    /// Commission paid on the entry leg.
    pub entry_commission: f64,
    /// Lowest close observed while held (entry bar included).
    pub lowest_close: f64,
    /// Highest close observed while held (entry bar included).
    pub highest_close: f64,
}

impl Position {
    pub fn open(
        entry_index: usize,
        entry_timestamp: DateTime<Utc>,
        entry_price: f64,
        quantity: f64,
        entry_commission: f64,
    ) -> Self {
        Self {
            entry_index,
            entry_timestamp,
            entry_price,
            quantity,
            entry_commission,
            lowest_close: entry_price,
            highest_close: entry_price,
        }
    }

    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.entry_price
    }

    pub fn market_value(&self, current_price: f64) -> f64 {
        self.quantity * current_price
    }

    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        self.quantity * (current_price - self.entry_price)
    }

    pub fn bars_held(&self, current_index: usize) -> usize {
        current_index.saturating_sub(self.entry_index)
    }

    /// Track the close range while the position is held.
    pub fn observe(&mut self, close: f64) {
        self.lowest_close = self.lowest_close.min(close);
        self.highest_close = self.highest_close.max(close);
    }
}
