//! Chaikin Money Flow (CMF) indicator.

use super::Indicator;
use crate::types::Bar;

/// Chaikin Money Flow.
///
/// CMF = Sum(Money Flow Volume) / Sum(Volume) over the period, where the
/// money flow multiplier is ((C - L) - (H - C)) / (H - L).
/// - Positive: buying pressure (accumulation)
/// - Negative: selling pressure (distribution)
pub struct Cmf {
    period: usize,
}

impl Default for Cmf {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl Cmf {
    pub fn new(period: usize) -> Self {
        Self { period: period.max(1) }
    }

    fn money_flow_multiplier(bar: &Bar) -> f64 {
        let range = bar.high - bar.low;
        if range > 0.0 {
            ((bar.close - bar.low) - (bar.high - bar.close)) / range
        } else {
            0.0
        }
    }
}

impl Indicator for Cmf {
    type Output = f64;

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Option<f64> {
        if bars.len() < self.period {
            return None;
        }

        let window = &bars[bars.len() - self.period..];
        if !window.iter().all(Bar::is_finite) {
            return None;
        }

        let sum_mfv: f64 = window
            .iter()
            .map(|b| Self::money_flow_multiplier(b) * b.volume)
            .sum();
        let sum_vol: f64 = window.iter().map(|b| b.volume).sum();

        if sum_vol <= 0.0 {
            return None;
        }

        Some(sum_mfv / sum_vol)
    }
}
