//! Buy on the first bar and hold until the engine closes out at series end.

use crate::domain::{Bar, Position};
use crate::strategy::{Signal, Strategy};

#[derive(Debug, Clone, Copy, Default)]
pub struct BuyAndHold;

impl Strategy for BuyAndHold {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn decide(&self, _bars: &[Bar], index: usize, position: Option<&Position>) -> Signal {
        if index == 0 && position.is_none() {
            Signal::Buy
        } else {
            Signal::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::{long_position, make_bars};

    #[test]
    fn buys_only_on_first_bar() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        assert_eq!(BuyAndHold.decide(&bars[..1], 0, None), Signal::Buy);
        assert_eq!(BuyAndHold.decide(&bars[..2], 1, None), Signal::Hold);
        assert_eq!(BuyAndHold.decide(&bars, 2, None), Signal::Hold);
    }

    #[test]
    fn never_sells() {
        let bars = make_bars(&[10.0, 5.0]);
        let pos = long_position(&bars);
        assert_eq!(BuyAndHold.decide(&bars, 1, Some(&pos)), Signal::Hold);
    }
}
