use serde::{Deserialize, Serialize};

use crate::types::{Bar, TradePlan};

/// Point-in-time descriptive fields for a symbol.
///
/// Every field is best effort: `None` means the provider did not report
/// it, not that the value is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_pe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_mean_price: Option<f64>,
    /// Analyst consensus key, e.g. "buy" or "hold".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fifty_two_week_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fifty_two_week_low: Option<f64>,
}

impl Snapshot {
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Upside to the analyst mean target, in percent of `price`.
    pub fn target_upside_pct(&self, price: f64) -> Option<f64> {
        let target = self.target_mean_price?;
        if price <= 0.0 {
            return None;
        }
        Some((target - price) / price * 100.0)
    }
}

/// News headline for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Unix timestamp (milliseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<i64>,
}

/// Deep-dive view for one selected symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    pub symbol: String,
    pub plan: TradePlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,
    pub news: Vec<NewsItem>,
    /// Bars behind the plan, for charting.
    pub bars: Vec<Bar>,
}
