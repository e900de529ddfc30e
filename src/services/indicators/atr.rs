//! Average True Range (ATR) indicator.

use super::Indicator;
use crate::types::Bar;

/// ATR (Average True Range) indicator.
///
/// Measures market volatility by averaging true ranges:
/// TR = max(High-Low, |High-PrevClose|, |Low-PrevClose|)
///
/// Smoothed with Wilder's method, seeded by the simple average of the first
/// `period` true ranges.
pub struct Atr {
    period: usize,
}

impl Default for Atr {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self { period: period.max(1) }
    }

    /// Calculate True Range.
    fn true_range(current: &Bar, previous: &Bar) -> f64 {
        let hl = current.high - current.low;
        let hc = (current.high - previous.close).abs();
        let lc = (current.low - previous.close).abs();
        hl.max(hc).max(lc)
    }
}

impl Indicator for Atr {
    type Output = f64;

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, bars: &[Bar]) -> Option<f64> {
        if bars.len() < self.min_periods() || !bars.iter().all(Bar::is_finite) {
            return None;
        }

        let true_ranges: Vec<f64> = bars
            .windows(2)
            .map(|pair| Self::true_range(&pair[1], &pair[0]))
            .collect();

        let initial_atr: f64 =
            true_ranges.iter().take(self.period).sum::<f64>() / self.period as f64;

        let mut atr = initial_atr;
        for tr in true_ranges.iter().skip(self.period) {
            atr = (atr * (self.period - 1) as f64 + tr) / self.period as f64;
        }

        Some(atr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::indicators::test_support::*;

    #[test]
    fn test_atr_min_periods() {
        assert_eq!(Atr::default().min_periods(), 15);
    }

    #[test]
    fn test_atr_insufficient_data() {
        assert!(Atr::default().calculate(&uptrend(14)).is_none());
    }

    #[test]
    fn test_atr_constant_range() {
        // Flat closes with a two-point range: every TR is 2
        let bars = bars_from_closes(&[100.0; 30]);
        let atr = Atr::default().calculate(&bars).unwrap();
        assert!((atr - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_atr_includes_gaps() {
        // Each bar gaps 1.5 above the previous close: TR = |high - prev close| = 2.5
        let atr = Atr::default().calculate(&uptrend(30)).unwrap();
        assert!((atr - 2.5).abs() < 1e-12, "got {}", atr);
    }

    #[test]
    fn test_atr_positive_value() {
        let atr = Atr::default().calculate(&downtrend(30)).unwrap();
        assert!(atr > 0.0);
    }
}
