//! Technical indicator implementations.
//!
//! Every indicator reads an ascending bar series and returns its latest
//! value, or `None` when the series is too short or the window holds a
//! non-finite number.

pub mod atr;
pub mod bollinger;
pub mod cmf;
pub mod ema;
pub mod macd;
pub mod mfi;
pub mod rsi;

pub use atr::Atr;
pub use bollinger::BollingerBands;
pub use cmf::Cmf;
pub use ema::Ema;
pub use macd::Macd;
pub use mfi::Mfi;
pub use rsi::Rsi;

use crate::types::{Bar, IndicatorSnapshot};

/// Trait for implementing technical indicators.
pub trait Indicator {
    /// Latest reading produced by the indicator.
    type Output;

    /// Minimum number of bars required for a value.
    fn min_periods(&self) -> usize;

    /// Calculate the latest value. Returns None if undefined.
    fn calculate(&self, bars: &[Bar]) -> Option<Self::Output>;
}

pub(crate) fn all_finite<'a>(values: impl IntoIterator<Item = &'a f64>) -> bool {
    values.into_iter().all(|v| v.is_finite())
}

/// Compute every indicator the rule table can read.
pub fn snapshot(bars: &[Bar], trend_ema_period: usize) -> IndicatorSnapshot {
    IndicatorSnapshot {
        rsi: Rsi::default().calculate(bars),
        mfi: Mfi::default().calculate(bars),
        cmf: Cmf::default().calculate(bars),
        macd: Macd::default().calculate(bars),
        bollinger: BollingerBands::default().calculate(bars),
        atr: Atr::default().calculate(bars),
        ema: Ema::new(trend_ema_period).calculate(bars),
    }
}
