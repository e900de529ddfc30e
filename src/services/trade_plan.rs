//! Buy / stop / target levels from Bollinger Bands and ATR.

use crate::services::indicators::{Atr, BollingerBands, Indicator};
use crate::types::{BandValue, Confidence, PlanStrategy, SymbolSeries, TradePlan};

/// Fallback band around price when volatility measures are missing.
const FALLBACK_STOP_PCT: f64 = 0.05;
/// Stop distance in ATRs below the buy level.
const STOP_ATR_MULTIPLE: f64 = 2.0;
/// Target distance as a multiple of risk.
const REWARD_RISK: f64 = 2.0;
/// Targets further than this above the upper band are pulled back to it.
const UPPER_BAND_CAP: f64 = 1.1;

/// Price levels before they are attached to a symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanLevels {
    pub buy: f64,
    pub stop: f64,
    pub target: f64,
    pub strategy: PlanStrategy,
    pub confidence: Confidence,
}

fn fixed_percentage(price: f64) -> PlanLevels {
    let buy = price;
    let stop = price * (1.0 - FALLBACK_STOP_PCT);
    PlanLevels {
        buy,
        stop,
        target: buy + REWARD_RISK * (buy - stop),
        strategy: PlanStrategy::FixedPercentage,
        confidence: Confidence::Low,
    }
}

/// Compute levels for `price` given the latest bands and ATR.
///
/// For a positive price the result always satisfies `stop < buy < target`.
pub fn plan_levels(price: f64, bands: Option<BandValue>, atr: Option<f64>) -> PlanLevels {
    let (bands, atr) = match (bands, atr) {
        (Some(b), Some(a)) if a > 0.0 && a.is_finite() => (b, a),
        _ => return fixed_percentage(price),
    };

    let (buy, strategy) = if price < bands.lower {
        (price, PlanStrategy::ExtremeOversold)
    } else {
        (
            bands.lower.max(price - 0.5 * atr),
            PlanStrategy::PullbackToSupport,
        )
    };

    let stop = buy - STOP_ATR_MULTIPLE * atr;
    let mut target = buy + REWARD_RISK * (buy - stop);
    // The cap must not drop the target to or below the buy level.
    if target > UPPER_BAND_CAP * bands.upper && bands.upper > buy {
        target = bands.upper;
    }

    PlanLevels {
        buy,
        stop,
        target,
        strategy,
        confidence: Confidence::Normal,
    }
}

/// Build the trade plan for a symbol's (longer-period) series.
pub fn trade_plan(series: &SymbolSeries) -> TradePlan {
    let price = series.last_close();
    let bands = BollingerBands::default().calculate(series.bars());
    let atr = Atr::default().calculate(series.bars());
    let levels = plan_levels(price, bands, atr);

    TradePlan {
        symbol: series.symbol().to_string(),
        current_price: price,
        buy_price: levels.buy,
        stop_loss: levels.stop,
        take_profit: levels.target,
        atr,
        lower_band: bands.map(|b| b.lower),
        upper_band: bands.map(|b| b.upper),
        strategy: levels.strategy,
        strategy_label: levels.strategy.label().to_string(),
        confidence: levels.confidence,
        timestamp: chrono::Utc::now().timestamp_millis(),
    }
}
