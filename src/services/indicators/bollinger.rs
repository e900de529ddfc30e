//! Bollinger Bands indicator.

use super::{all_finite, Indicator};
use crate::types::{BandValue, Bar};

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(20)
/// - Upper band: SMA + 2 * StdDev
/// - Lower band: SMA - 2 * StdDev
///
/// The standard deviation is the population deviation of the same window.
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period: period.max(1),
            std_dev_multiplier,
        }
    }

    /// Calculate standard deviation.
    fn std_dev(values: &[f64], mean: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let variance: f64 =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }
}

impl Indicator for BollingerBands {
    type Output = BandValue;

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Option<BandValue> {
        if bars.len() < self.period {
            return None;
        }

        let closes: Vec<f64> = bars[bars.len() - self.period..]
            .iter()
            .map(|b| b.close)
            .collect();
        if !all_finite(&closes) {
            return None;
        }

        let middle = closes.iter().sum::<f64>() / self.period as f64;
        let std_dev = Self::std_dev(&closes, middle);

        Some(BandValue {
            lower: middle - self.std_dev_multiplier * std_dev,
            middle,
            upper: middle + self.std_dev_multiplier * std_dev,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::indicators::test_support::*;

    #[test]
    fn test_bollinger_insufficient_data() {
        assert!(BollingerBands::default().calculate(&uptrend(19)).is_none());
    }

    #[test]
    fn test_bollinger_constant_series_collapses() {
        let bands = BollingerBands::default()
            .calculate(&bars_from_closes(&[10.0; 20]))
            .unwrap();
        assert_eq!(bands.lower, 10.0);
        assert_eq!(bands.middle, 10.0);
        assert_eq!(bands.upper, 10.0);
    }

    #[test]
    fn test_bollinger_known_values() {
        // Ten 9s and ten 11s: mean 10, population stdev 1
        let mut closes = vec![9.0; 10];
        closes.extend(vec![11.0; 10]);
        let bands = BollingerBands::default()
            .calculate(&bars_from_closes(&closes))
            .unwrap();
        assert!((bands.middle - 10.0).abs() < 1e-12);
        assert!((bands.upper - 12.0).abs() < 1e-12);
        assert!((bands.lower - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_bollinger_uses_latest_window() {
        let mut closes = vec![1000.0; 10];
        closes.extend(vec![10.0; 20]);
        let bands = BollingerBands::default()
            .calculate(&bars_from_closes(&closes))
            .unwrap();
        assert_eq!(bands.middle, 10.0);
    }

    #[test]
    fn test_bollinger_ordering() {
        let bands = BollingerBands::default().calculate(&uptrend(40)).unwrap();
        assert!(bands.lower < bands.middle && bands.middle < bands.upper);
    }
}
