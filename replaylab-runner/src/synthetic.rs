//! Deterministic synthetic price series for tests, benchmarks and demos.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use replaylab_core::domain::Bar;

/// Generate `bars` daily bars starting at `start`, skipping weekends.
///
/// The random walk is seeded from the BLAKE3 hash of `label`, so the same
/// label always yields the same series. Daily returns are drawn uniformly
/// from ±3%.
pub fn synthetic_series(label: &str, start: DateTime<Utc>, bars: usize) -> Vec<Bar> {
    // Deterministic seed from label
    let seed: [u8; 32] = *blake3::hash(label.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut series = Vec::with_capacity(bars);
    let mut price = 100.0_f64;
    let mut current = start;

    while series.len() < bars {
        let weekday = current.weekday();
        if weekday == Weekday::Sat || weekday == Weekday::Sun {
            current += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000.0..5_000_000.0_f64).round();

        series.push(Bar::new(current, open, high, low, close, volume));

        price = close;
        current += Duration::days(1);
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use replaylab_core::domain::validate_series;

    fn start() -> DateTime<Utc> {
        // a Monday
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn same_label_same_series() {
        assert_eq!(
            synthetic_series("SPY", start(), 100),
            synthetic_series("SPY", start(), 100)
        );
    }

    #[test]
    fn different_labels_differ() {
        let a = synthetic_series("SPY", start(), 50);
        let b = synthetic_series("QQQ", start(), 50);
        assert_ne!(a, b);
    }

    #[test]
    fn series_is_valid_and_skips_weekends() {
        let series = synthetic_series("SPY", start(), 30);
        assert_eq!(series.len(), 30);
        assert!(validate_series(&series).is_ok());
        assert!(series.iter().all(|b| b.is_sane()));
        assert!(series
            .iter()
            .all(|b| !matches!(b.timestamp.weekday(), Weekday::Sat | Weekday::Sun)));
        // 30 weekdays from a Monday span six weeks
        assert_eq!(series[29].timestamp - series[0].timestamp, Duration::days(39));
    }

    #[test]
    fn zero_bars_is_empty() {
        assert!(synthetic_series("SPY", start(), 0).is_empty());
    }
}
