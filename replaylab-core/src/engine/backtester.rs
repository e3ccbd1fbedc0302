//! Bar-by-bar simulation loop: the heart of the backtesting engine.
//!
//! Per bar, in order:
//! 1. Ask the strategy for a decision, passing only the prefix up to this bar
//! 2. Fill a buy (while flat) or a sell (while holding) at this bar's close
//! 3. Record one equity snapshot marked at this bar's close
//!
//! A position still open after the last bar is closed at the last close.

use tracing::debug;

use super::config::EngineConfig;
use super::error::EngineError;
use super::state::{EngineState, RunResult};
use crate::domain::{validate_series, Bar, ExitReason, Position, Trade};
use crate::strategy::{Signal, Strategy};

/// Single-asset, long-or-flat backtester.
///
/// Holds only immutable configuration, so one instance can serve any number
/// of runs, including concurrent ones.
#[derive(Debug, Clone)]
pub struct Backtester {
    config: EngineConfig,
}

impl Backtester {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Build a backtester from raw settings, validating them first.
    pub fn with_settings(initial_capital: f64, commission_rate: f64) -> Result<Self, EngineError> {
        Ok(Self::new(EngineConfig::new(initial_capital, commission_rate)?))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replay `bars` through `strategy`.
    ///
    /// Fails only if the series is invalid; the check happens before any
    /// state is created.
    pub fn run<S: Strategy + ?Sized>(
        &self,
        bars: &[Bar],
        strategy: &S,
    ) -> Result<RunResult, EngineError> {
        validate_series(bars)?;

        let mut state = EngineState::new(self.config.initial_capital());
        let mut equity_curve = Vec::with_capacity(bars.len());
        let mut trades = Vec::new();

        debug!(strategy = strategy.name(), bars = bars.len(), "run started");

        for (index, bar) in bars.iter().enumerate() {
            if let Some(position) = state.position.as_mut() {
                position.observe(bar.close);
            }

            let signal = strategy.decide(&bars[..=index], index, state.position.as_ref());

            match signal {
                Signal::Buy if state.is_flat() => self.open_position(&mut state, index, bar),
                Signal::Sell => {
                    if let Some(position) = state.position.take() {
                        trades.push(self.close_position(
                            &mut state,
                            position,
                            index,
                            bar,
                            ExitReason::Signal,
                        ));
                    }
                }
                _ => {}
            }

            equity_curve.push(state.snapshot(index, bar));
        }

        let last_index = bars.len() - 1;
        if let Some(position) = state.position.take() {
            trades.push(self.close_position(
                &mut state,
                position,
                last_index,
                &bars[last_index],
                ExitReason::EndOfSeries,
            ));
        }

        debug!(
            strategy = strategy.name(),
            trades = trades.len(),
            cash = state.cash,
            commission = state.total_commission,
            "run finished"
        );

        Ok(RunResult {
            initial_capital: self.config.initial_capital(),
            equity_curve,
            trades,
            final_state: state,
        })
    }

    fn open_position(&self, state: &mut EngineState, index: usize, bar: &Bar) {
        let rate = self.config.entry_rate();
        let mut notional = state.cash * self.config.position_size();
        // Never commit more than the cash on hand once commission is added.
        if notional * (1.0 + rate) > state.cash {
            notional = state.cash / (1.0 + rate);
        }
        if notional <= 0.0 {
            debug!(index, cash = state.cash, "buy skipped: no cash to commit");
            return;
        }

        let price = bar.close;
        let quantity = notional / price;
        let commission = notional * rate;

        state.cash -= notional + commission;
        state.total_commission += commission;
        state.position = Some(Position::open(
            index,
            bar.timestamp,
            price,
            quantity,
            commission,
        ));

        debug!(index, price, quantity, commission, "opened long");
    }

    fn close_position(
        &self,
        state: &mut EngineState,
        position: Position,
        index: usize,
        bar: &Bar,
        reason: ExitReason,
    ) -> Trade {
        let price = bar.close;
        let proceeds = position.market_value(price);
        let exit_commission = proceeds * self.config.exit_rate();
        let net_proceeds = proceeds - exit_commission;

        state.cash += net_proceeds;
        state.total_commission += exit_commission;

        let gross_pnl = position.unrealized_pnl(price);
        let commission = position.entry_commission + exit_commission;
        let cost_basis = position.cost_basis();

        debug!(
            index,
            price,
            quantity = position.quantity,
            commission = exit_commission,
            reason = ?reason,
            "closed long"
        );

        Trade {
            entry_index: position.entry_index,
            entry_timestamp: position.entry_timestamp,
            entry_price: position.entry_price,
            exit_index: index,
            exit_timestamp: bar.timestamp,
            exit_price: price,
            exit_reason: reason,
            quantity: position.quantity,
            gross_pnl,
            commission,
            net_pnl: gross_pnl - commission,
            return_pct: net_proceeds / cost_basis - 1.0,
            bars_held: position.bars_held(index),
            mae: position.unrealized_pnl(position.lowest_close),
            mfe: position.unrealized_pnl(position.highest_close),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::CommissionLegs;
    use crate::strategy::{BuyAndHold, FnStrategy};
    use chrono::{Duration, TimeZone, Utc};

    fn make_bars(closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(start + Duration::days(i as i64), c, c + 1.0, c - 1.0, c, 1.0))
            .collect()
    }

    fn scripted(script: &'static [(usize, Signal)]) -> impl Strategy {
        FnStrategy::new("scripted", move |_bars: &[Bar], index, _pos: Option<&Position>| {
            script
                .iter()
                .find(|(i, _)| *i == index)
                .map_or(Signal::Hold, |(_, s)| *s)
        })
    }

    fn backtester(capital: f64, rate: f64) -> Backtester {
        Backtester::with_settings(capital, rate).unwrap()
    }

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "actual={actual}, expected={expected}"
        );
    }

    #[test]
    fn buy_then_sell_round_trip() {
        let bars = make_bars(&[100.0, 110.0]);
        let strategy = scripted(&[(0, Signal::Buy), (1, Signal::Sell)]);
        let result = backtester(10_000.0, 0.001).run(&bars, &strategy).unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        approx(trade.quantity, 95.0);
        approx(trade.gross_pnl, 950.0);
        // 9.5 on entry + 10.45 on exit
        approx(trade.commission, 19.95);
        approx(trade.net_pnl, 930.05);
        approx(trade.return_pct, 10_439.55 / 9_500.0 - 1.0);
        assert_eq!(trade.bars_held, 1);
        assert_eq!(trade.exit_reason, ExitReason::Signal);

        approx(result.equity_curve[0].equity, 490.5 + 9_500.0);
        approx(result.equity_curve[1].equity, 10_930.05);
        approx(result.realized_equity(), 10_930.05);
        approx(result.final_state.total_commission, 19.95);
    }

    #[test]
    fn never_buying_keeps_capital() {
        let bars = make_bars(&[100.0, 90.0, 120.0]);
        let strategy = scripted(&[]);
        let result = backtester(10_000.0, 0.001).run(&bars, &strategy).unwrap();

        assert!(result.trades.is_empty());
        assert_eq!(result.final_equity(), 10_000.0);
        assert!(result.equity_curve.iter().all(|s| s.equity == 10_000.0));
    }

    #[test]
    fn open_position_is_force_closed_at_last_close() {
        let bars = make_bars(&[100.0, 105.0, 120.0]);
        let result = backtester(10_000.0, 0.0).run(&bars, &BuyAndHold).unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.exit_reason, ExitReason::EndOfSeries);
        assert_eq!(trade.exit_index, 2);
        assert_eq!(trade.exit_price, 120.0);
        assert!(result.final_state.is_flat());
    }

    #[test]
    fn redundant_signals_are_no_ops() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 100.0]);
        let strategy = scripted(&[
            (0, Signal::Sell),
            (1, Signal::Buy),
            (2, Signal::Buy),
            (3, Signal::Sell),
        ]);
        let result = backtester(1_000.0, 0.0).run(&bars, &strategy).unwrap();

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].entry_index, 1);
        assert_eq!(result.trades[0].exit_index, 3);
    }

    #[test]
    fn equity_snapshot_per_bar() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = backtester(1_000.0, 0.001).run(&bars, &BuyAndHold).unwrap();
        assert_eq!(result.equity_curve.len(), bars.len());
        for (i, snap) in result.equity_curve.iter().enumerate() {
            assert_eq!(snap.index, i);
            assert_eq!(snap.timestamp, bars[i].timestamp);
        }
    }

    #[test]
    fn tiny_capital_buys_fractional_quantity() {
        let bars = make_bars(&[50_000.0, 55_000.0]);
        let result = backtester(1.0, 0.0).run(&bars, &BuyAndHold).unwrap();
        let trade = &result.trades[0];
        approx(trade.quantity, 0.95 / 50_000.0);
        assert!(trade.net_pnl > 0.0);
    }

    #[test]
    fn full_size_never_overdraws_cash() {
        let config = EngineConfig::new(1_000.0, 0.01)
            .unwrap()
            .with_position_size(1.0)
            .unwrap();
        let bars = make_bars(&[10.0, 10.0]);
        let result = Backtester::new(config).run(&bars, &BuyAndHold).unwrap();
        approx(result.equity_curve[0].cash, 0.0);
    }

    #[test]
    fn entry_only_commission() {
        let config = EngineConfig::new(10_000.0, 0.001)
            .unwrap()
            .with_commission_legs(CommissionLegs::EntryOnly);
        let bars = make_bars(&[100.0, 110.0]);
        let strategy = scripted(&[(0, Signal::Buy), (1, Signal::Sell)]);
        let result = Backtester::new(config).run(&bars, &strategy).unwrap();
        approx(result.trades[0].commission, 9.5);
        approx(result.trades[0].net_pnl, 940.5);
    }

    #[test]
    fn excursions_track_closes_while_held() {
        let bars = make_bars(&[100.0, 90.0, 130.0, 110.0]);
        let result = backtester(10_000.0, 0.0).run(&bars, &BuyAndHold).unwrap();
        let trade = &result.trades[0];
        approx(trade.mae, trade.quantity * -10.0);
        approx(trade.mfe, trade.quantity * 30.0);
    }

    #[test]
    fn invalid_series_fails_fast() {
        let err = backtester(1_000.0, 0.0).run(&[], &BuyAndHold).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSeries(_)));

        let mut bars = make_bars(&[1.0, 2.0]);
        bars[1].timestamp = bars[0].timestamp;
        let err = backtester(1_000.0, 0.0).run(&bars, &BuyAndHold).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSeries(_)));
    }

    #[test]
    fn invalid_settings_fail_at_construction() {
        assert!(matches!(
            Backtester::with_settings(0.0, 0.001),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            Backtester::with_settings(1_000.0, -0.5),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }
}
