//! Trade: a completed round trip, immutable once recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// The strategy emitted `Sell` while holding.
    Signal,
    /// Still open after the last bar; closed at the final close.
    EndOfSeries,
}

/// A complete round-trip trade record: entry → exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Entry ──
    pub entry_index: usize,
    pub entry_timestamp: DateTime<Utc>,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_index: usize,
    pub exit_timestamp: DateTime<Utc>,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    // ── Size ──
    pub quantity: f64,

    // ── PnL ──
    /// `quantity * (exit_price - entry_price)`.
    pub gross_pnl: f64,
    /// Commission charged on both legs.
    pub commission: f64,
    pub net_pnl: f64,
    /// Net exit proceeds over entry cost basis, minus one.
    pub return_pct: f64,

    // ── Duration ──
    pub bars_held: usize,

    // ── Excursion ──
    /// Maximum adverse excursion (worst unrealized loss on closes while held).
    pub mae: f64,
    /// Maximum favorable excursion (best unrealized gain on closes while held).
    pub mfe: f64,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.net_pnl < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_trade(net_pnl: f64) -> Trade {
        let ts = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        Trade {
            entry_index: 4,
            entry_timestamp: ts,
            entry_price: 100.0,
            exit_index: 8,
            exit_timestamp: ts + chrono::Duration::days(4),
            exit_price: 110.0,
            exit_reason: ExitReason::Signal,
            quantity: 50.0,
            gross_pnl: 500.0,
            commission: 500.0 - net_pnl,
            net_pnl,
            return_pct: 0.097,
            bars_held: 4,
            mae: -50.0,
            mfe: 600.0,
        }
    }

    #[test]
    fn winner_and_loser_are_exclusive() {
        assert!(sample_trade(485.0).is_winner());
        assert!(!sample_trade(485.0).is_loser());
        assert!(sample_trade(-10.0).is_loser());
        let flat = sample_trade(0.0);
        assert!(!flat.is_winner() && !flat.is_loser());
    }

    #[test]
    fn exit_reason_serializes_snake_case() {
        let json = serde_json::to_string(&ExitReason::EndOfSeries).unwrap();
        assert_eq!(json, "\"end_of_series\"");
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade(485.0);
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deser);
    }
}
