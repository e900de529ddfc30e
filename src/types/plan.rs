use serde::{Deserialize, Serialize};

/// How the buy level was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStrategy {
    /// Price is already below the lower band: buy at market.
    ExtremeOversold,
    /// Wait for a dip towards the lower band.
    PullbackToSupport,
    /// Bands or ATR unavailable; levels are a fixed percentage of price.
    FixedPercentage,
}

impl PlanStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            PlanStrategy::ExtremeOversold => "extreme oversold",
            PlanStrategy::PullbackToSupport => "pullback to support",
            PlanStrategy::FixedPercentage => "fixed percentage band",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Normal,
    Low,
}

/// Buy / stop / target levels for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradePlan {
    pub symbol: String,
    pub current_price: f64,
    pub buy_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_band: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_band: Option<f64>,
    pub strategy: PlanStrategy,
    /// Display form of `strategy`.
    pub strategy_label: String,
    pub confidence: Confidence,
    /// Unix timestamp (milliseconds) when computed.
    pub timestamp: i64,
}

impl TradePlan {
    pub fn is_low_confidence(&self) -> bool {
        self.confidence == Confidence::Low
    }

    /// Reward divided by risk.
    pub fn reward_risk(&self) -> f64 {
        (self.take_profit - self.buy_price) / (self.buy_price - self.stop_loss)
    }
}
