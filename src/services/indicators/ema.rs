//! Exponential Moving Average (EMA) indicator.

use super::{all_finite, Indicator};
use crate::types::Bar;

/// EMA (Exponential Moving Average) indicator.
///
/// Like SMA but gives more weight to recent prices. Seeded with the SMA of
/// the first `period` closes.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period: period.max(1) }
    }
}

/// EMA over `values`, one output per input starting at index `period - 1`.
///
/// Returns an empty vector when there are fewer than `period` values.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema = Vec::with_capacity(values.len() - period + 1);

    // First EMA is SMA
    let sma: f64 = values.iter().take(period).sum::<f64>() / period as f64;
    ema.push(sma);

    let mut last = sma;
    for value in &values[period..] {
        last = (value - last) * multiplier + last;
        ema.push(last);
    }

    ema
}

impl Indicator for Ema {
    type Output = f64;

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Option<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        if !all_finite(&closes) {
            return None;
        }
        ema_series(&closes, self.period).last().copied()
    }
}
