//! Money Flow Index (MFI) indicator.

use super::{all_finite, Indicator};
use crate::types::Bar;

/// MFI (Money Flow Index) indicator.
///
/// Volume-weighted RSI over the typical price (H+L+C)/3:
/// MFI = 100 - (100 / (1 + Money Flow Ratio))
///
/// Low readings mean money is flowing in on falling prices (accumulation),
/// high readings mean the move is overheated.
pub struct Mfi {
    period: usize,
}

impl Default for Mfi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Mfi {
    pub fn new(period: usize) -> Self {
        Self { period: period.max(1) }
    }
}

impl Indicator for Mfi {
    type Output = f64;

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, bars: &[Bar]) -> Option<f64> {
        if bars.len() < self.min_periods() {
            return None;
        }

        let window = &bars[bars.len() - self.min_periods()..];
        if !window.iter().all(Bar::is_finite) {
            return None;
        }

        let mut positive_flow = 0.0;
        let mut negative_flow = 0.0;

        for pair in window.windows(2) {
            let prev_tp = pair[0].typical_price();
            let current_tp = pair[1].typical_price();
            let money_flow = current_tp * pair[1].volume;

            if current_tp > prev_tp {
                positive_flow += money_flow;
            } else if current_tp < prev_tp {
                negative_flow += money_flow;
            }
        }

        if !all_finite(&[positive_flow, negative_flow]) || positive_flow + negative_flow <= 0.0 {
            return None;
        }

        if negative_flow == 0.0 {
            return Some(100.0);
        }

        let money_flow_ratio = positive_flow / negative_flow;
        Some(100.0 - (100.0 / (1.0 + money_flow_ratio)))
    }
}
