//! MACD (Moving Average Convergence Divergence) indicator.

use super::ema::ema_series;
use super::{all_finite, Indicator};
use crate::types::{Bar, MacdValue};

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
/// - Histogram = MACD Line - Signal Line
///
/// A line above its signal is read as a bullish cross.
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        let fast_period = fast_period.max(1);
        Self {
            fast_period,
            slow_period: slow_period.max(fast_period),
            signal_period: signal_period.max(1),
        }
    }
}

impl Indicator for Macd {
    type Output = MacdValue;

    fn min_periods(&self) -> usize {
        self.slow_period + self.signal_period - 1
    }

    fn calculate(&self, bars: &[Bar]) -> Option<MacdValue> {
        if bars.len() < self.min_periods() {
            return None;
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        if !all_finite(&closes) {
            return None;
        }

        let fast_ema = ema_series(&closes, self.fast_period);
        let slow_ema = ema_series(&closes, self.slow_period);

        // Align the EMAs (fast starts earlier)
        let offset = self.slow_period - self.fast_period;
        let macd_line: Vec<f64> = fast_ema
            .iter()
            .skip(offset)
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect();

        let signal_line = ema_series(&macd_line, self.signal_period);

        let line = *macd_line.last()?;
        let signal = *signal_line.last()?;

        Some(MacdValue {
            line,
            signal,
            histogram: line - signal,
        })
    }
}
