//! Performance metrics: pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: equity curve and/or trade list in, scalar out.
//! Degenerate input (no trades, flat equity, a single bar) maps to an explicit
//! fallback value, never to an error or a NaN.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{equity_values, EquitySnapshot, Trade};
use crate::engine::ConfigError;

/// Default number of bars per year (daily equity bars).
pub const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;

/// Parameters for annualization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsConfig {
    periods_per_year: f64,
    /// Annual risk-free rate as a fraction.
    risk_free_rate: f64,
}

impl MetricsConfig {
    pub fn new(periods_per_year: f64, risk_free_rate: f64) -> Result<Self, ConfigError> {
        if !periods_per_year.is_finite() || periods_per_year <= 0.0 {
            return Err(ConfigError::InvalidPeriodsPerYear(periods_per_year));
        }
        if !risk_free_rate.is_finite() {
            return Err(ConfigError::InvalidRiskFreeRate(risk_free_rate));
        }
        Ok(Self {
            periods_per_year,
            risk_free_rate,
        })
    }

    pub fn periods_per_year(&self) -> f64 {
        self.periods_per_year
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            risk_free_rate: 0.0,
        }
    }
}

/// A reported metric: a finite number, or the sentinel for an unbounded ratio.
///
/// Serializes as a JSON number, or as the string `"inf"` for the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MetricRepr", into = "MetricRepr")]
pub enum MetricValue {
    Number(f64),
    Infinite,
}

impl MetricValue {
    /// Wrap a ratio that may overflow, mapping `+inf` to the sentinel.
    pub fn unbounded(v: f64) -> Self {
        if v == f64::INFINITY {
            MetricValue::Infinite
        } else {
            MetricValue::Number(v)
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            MetricValue::Number(v) => v,
            MetricValue::Infinite => f64::INFINITY,
        }
    }

    pub fn is_infinite(self) -> bool {
        matches!(self, MetricValue::Infinite)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Number(v)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(v) => write!(f, "{v}"),
            MetricValue::Infinite => f.write_str("inf"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum MetricRepr {
    Number(f64),
    Text(String),
}

impl From<MetricValue> for MetricRepr {
    fn from(value: MetricValue) -> Self {
        match value {
            MetricValue::Number(v) => MetricRepr::Number(v),
            MetricValue::Infinite => MetricRepr::Text("inf".to_string()),
        }
    }
}

impl TryFrom<MetricRepr> for MetricValue {
    type Error = String;

    fn try_from(repr: MetricRepr) -> Result<Self, Self::Error> {
        match repr {
            MetricRepr::Number(v) => Ok(MetricValue::Number(v)),
            MetricRepr::Text(s) if s == "inf" => Ok(MetricValue::Infinite),
            MetricRepr::Text(s) => Err(format!("unknown metric sentinel {s:?}")),
        }
    }
}

/// Aggregate performance report for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub initial_capital: f64,
    pub final_equity: f64,
    /// Sum of trade net P/L.
    pub net_profit: f64,
    pub total_return: f64,
    pub annualized_return: MetricValue,
    pub volatility: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: MetricValue,
    pub max_drawdown: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub profit_factor: MetricValue,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub avg_holding_bars: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub total_commission: f64,
}

impl PerformanceReport {
    /// Compute all metrics from an equity curve and trade list.
    pub fn compute(
        equity_curve: &[EquitySnapshot],
        trades: &[Trade],
        initial_capital: f64,
        config: &MetricsConfig,
    ) -> Self {
        let equity = equity_values(equity_curve);
        let ppy = config.periods_per_year();
        let rf = config.risk_free_rate();

        let final_equity = equity.last().copied().unwrap_or(initial_capital);
        let total = total_return(final_equity, initial_capital);
        let annualized = annualized_return(total, equity.len(), ppy);
        let drawdown = max_drawdown(&equity);

        Self {
            initial_capital,
            final_equity,
            net_profit: net_profit(trades),
            total_return: total,
            annualized_return: MetricValue::unbounded(annualized),
            volatility: volatility(&equity, ppy),
            sharpe: sharpe_ratio(&equity, rf, ppy),
            sortino: sortino_ratio(&equity, rf, ppy),
            calmar: MetricValue::unbounded(calmar_ratio(annualized, drawdown)),
            max_drawdown: drawdown,
            total_trades: trades.len(),
            winning_trades: trades.iter().filter(|t| t.is_winner()).count(),
            losing_trades: trades.iter().filter(|t| t.is_loser()).count(),
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            avg_win: avg_win(trades),
            avg_loss: avg_loss(trades),
            largest_win: largest_win(trades),
            largest_loss: largest_loss(trades),
            avg_holding_bars: avg_holding_bars(trades),
            max_consecutive_wins: max_consecutive_wins(trades),
            max_consecutive_losses: max_consecutive_losses(trades),
            total_commission: trades.iter().map(|t| t.commission).sum(),
        }
    }

    /// Flat metric-name → value mapping, ordered by name.
    pub fn to_map(&self) -> BTreeMap<String, MetricValue> {
        let count = |n: usize| MetricValue::Number(n as f64);
        [
            ("initial_capital", self.initial_capital.into()),
            ("final_equity", self.final_equity.into()),
            ("net_profit", self.net_profit.into()),
            ("total_return", self.total_return.into()),
            ("annualized_return", self.annualized_return),
            ("volatility", self.volatility.into()),
            ("sharpe", self.sharpe.into()),
            ("sortino", self.sortino.into()),
            ("calmar", self.calmar),
            ("max_drawdown", self.max_drawdown.into()),
            ("total_trades", count(self.total_trades)),
            ("winning_trades", count(self.winning_trades)),
            ("losing_trades", count(self.losing_trades)),
            ("win_rate", self.win_rate.into()),
            ("profit_factor", self.profit_factor),
            ("avg_win", self.avg_win.into()),
            ("avg_loss", self.avg_loss.into()),
            ("largest_win", self.largest_win.into()),
            ("largest_loss", self.largest_loss.into()),
            ("avg_holding_bars", self.avg_holding_bars.into()),
            ("max_consecutive_wins", count(self.max_consecutive_wins)),
            ("max_consecutive_losses", count(self.max_consecutive_losses)),
            ("total_commission", self.total_commission.into()),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
    }
}

// ─── Return metrics ─────────────────────────────────────────────────

/// Return on investment as a fraction: final / initial − 1.
pub fn total_return(final_equity: f64, initial_capital: f64) -> f64 {
    if initial_capital <= 0.0 {
        return 0.0;
    }
    final_equity / initial_capital - 1.0
}

/// Geometric annualization of `total_return` over `n_bars` bars.
///
/// Returns 0.0 for fewer than 2 bars. A total loss annualizes to −1.0.
/// Very short runs with large gains can overflow to `+inf`.
pub fn annualized_return(total_return: f64, n_bars: usize, periods_per_year: f64) -> f64 {
    if n_bars < 2 || periods_per_year <= 0.0 {
        return 0.0;
    }
    let growth = 1.0 + total_return;
    if growth <= 0.0 {
        return -1.0;
    }
    growth.powf(periods_per_year / n_bars as f64) - 1.0
}

/// Sum of trade net P/L, in chronological order.
pub fn net_profit(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.net_pnl).sum()
}

// ─── Risk metrics ───────────────────────────────────────────────────

/// Annualized standard deviation of per-bar returns.
pub fn volatility(equity_curve: &[f64], periods_per_year: f64) -> f64 {
    let returns = per_bar_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    std_dev(&returns) * periods_per_year.sqrt()
}

/// Annualized Sharpe ratio from per-bar returns.
///
/// Sharpe = mean(returns − rf) / std(returns − rf) × sqrt(periods per year).
/// Returns 0.0 if variance is zero or fewer than 2 snapshots.
pub fn sharpe_ratio(equity_curve: &[f64], risk_free_rate: f64, periods_per_year: f64) -> f64 {
    let excess = excess_returns(equity_curve, risk_free_rate, periods_per_year);
    if excess.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&excess);
    if std < 1e-15 {
        return 0.0;
    }
    (mean_f64(&excess) / std) * periods_per_year.sqrt()
}

/// Annualized Sortino ratio (downside deviation only).
///
/// Returns 0.0 if there is no downside or fewer than 2 snapshots.
pub fn sortino_ratio(equity_curve: &[f64], risk_free_rate: f64, periods_per_year: f64) -> f64 {
    let excess = excess_returns(equity_curve, risk_free_rate, periods_per_year);
    if excess.len() < 2 {
        return 0.0;
    }

    let downside_sq: f64 = excess.iter().filter(|&&r| r < 0.0).map(|r| r * r).sum();
    let downside_std = (downside_sq / excess.len() as f64).sqrt();
    if downside_std < 1e-15 {
        return 0.0;
    }
    (mean_f64(&excess) / downside_std) * periods_per_year.sqrt()
}

/// Calmar ratio: annualized return / |max drawdown|.
///
/// Returns 0.0 when there was no drawdown.
pub fn calmar_ratio(annualized_return: f64, max_drawdown: f64) -> f64 {
    if max_drawdown >= 0.0 {
        return 0.0;
    }
    annualized_return / max_drawdown.abs()
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// Single forward pass tracking the running peak. Returns 0.0 if equity
/// never falls below a prior peak.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            max_dd = max_dd.min((eq - peak) / peak);
        }
    }
    max_dd
}

// ─── Trade metrics ──────────────────────────────────────────────────

/// Fraction of trades with positive net P/L.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Gross profits / gross losses.
///
/// `Infinite` when there are winners but no losers; 0.0 with no trades or no winners.
pub fn profit_factor(trades: &[Trade]) -> MetricValue {
    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.is_winner())
        .map(|t| t.net_pnl)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.is_loser())
        .map(|t| t.net_pnl.abs())
        .sum();

    if gross_loss == 0.0 {
        return if gross_profit > 0.0 {
            MetricValue::Infinite
        } else {
            MetricValue::Number(0.0)
        };
    }
    MetricValue::Number(gross_profit / gross_loss)
}

/// Mean net P/L of winning trades; 0.0 without winners.
pub fn avg_win(trades: &[Trade]) -> f64 {
    let wins: Vec<f64> = winners(trades).collect();
    mean_f64(&wins)
}

/// Mean net P/L of losing trades (non-positive); 0.0 without losers.
pub fn avg_loss(trades: &[Trade]) -> f64 {
    let losses: Vec<f64> = losers(trades).collect();
    mean_f64(&losses)
}

/// Best winning trade's net P/L; 0.0 without winners.
pub fn largest_win(trades: &[Trade]) -> f64 {
    winners(trades).fold(0.0, f64::max)
}

/// Worst losing trade's net P/L (non-positive); 0.0 without losers.
pub fn largest_loss(trades: &[Trade]) -> f64 {
    losers(trades).fold(0.0, f64::min)
}

/// Mean holding duration in bars; 0.0 with no trades.
pub fn avg_holding_bars(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.bars_held).sum::<usize>() as f64 / trades.len() as f64
}

/// Maximum consecutive winning trades.
pub fn max_consecutive_wins(trades: &[Trade]) -> usize {
    max_streak(trades, Trade::is_winner)
}

/// Maximum consecutive losing trades.
pub fn max_consecutive_losses(trades: &[Trade]) -> usize {
    max_streak(trades, Trade::is_loser)
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Simple per-bar returns of an equity curve.
pub fn per_bar_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}

fn excess_returns(equity_curve: &[f64], risk_free_rate: f64, periods_per_year: f64) -> Vec<f64> {
    let per_bar_rf = risk_free_rate / periods_per_year;
    per_bar_returns(equity_curve)
        .into_iter()
        .map(|r| r - per_bar_rf)
        .collect()
}

fn winners(trades: &[Trade]) -> impl Iterator<Item = f64> + '_ {
    trades.iter().filter(|t| t.is_winner()).map(|t| t.net_pnl)
}

fn losers(trades: &[Trade]) -> impl Iterator<Item = f64> + '_ {
    trades.iter().filter(|t| t.is_loser()).map(|t| t.net_pnl)
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1 denominator).
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn max_streak(trades: &[Trade], pred: fn(&Trade) -> bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for trade in trades {
        if pred(trade) {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}
