use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Latest MACD reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdValue {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Latest Bollinger Band reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandValue {
    pub lower: f64,
    pub middle: f64,
    pub upper: f64,
}

/// Most recent value of every indicator for one series.
///
/// `None` means the indicator is undefined for this series (too little
/// history or a non-finite window). It is never replaced by a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub mfi: Option<f64>,
    pub cmf: Option<f64>,
    pub macd: Option<MacdValue>,
    pub bollinger: Option<BandValue>,
    pub atr: Option<f64>,
    /// Trend EMA (period set by the scoring thresholds).
    pub ema: Option<f64>,
}

/// Discrete rating derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    StrongBuy,
    Buy,
    Hold,
    Sell,
}

impl Rating {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "strong_buy" => Some(Rating::StrongBuy),
            "buy" => Some(Rating::Buy),
            "hold" => Some(Rating::Hold),
            "sell" => Some(Rating::Sell),
            _ => None,
        }
    }
}

/// Score breakpoints for [`Rating`].
///
/// `score >= strong_buy` is Strong Buy, `score >= buy` is Buy,
/// `score <= sell` is Sell, anything between is Hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBreakpoints {
    pub strong_buy: i32,
    pub buy: i32,
    pub sell: i32,
}

impl Default for RatingBreakpoints {
    fn default() -> Self {
        Self {
            strong_buy: 5,
            buy: 3,
            sell: 1,
        }
    }
}

impl RatingBreakpoints {
    /// Build breakpoints, rejecting overlapping bands.
    pub fn new(strong_buy: i32, buy: i32, sell: i32) -> Result<Self, ConfigError> {
        if strong_buy < buy || buy <= sell {
            return Err(ConfigError::Breakpoints {
                strong_buy,
                buy,
                sell,
            });
        }
        Ok(Self {
            strong_buy,
            buy,
            sell,
        })
    }

    /// Map a score to its rating. Every integer maps to exactly one rating.
    pub fn rate(&self, score: i32) -> Rating {
        if score >= self.strong_buy {
            Rating::StrongBuy
        } else if score >= self.buy {
            Rating::Buy
        } else if score <= self.sell {
            Rating::Sell
        } else {
            Rating::Hold
        }
    }
}

/// Coarse play suggested by the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Price is oversold (lower band breached or RSI oversold).
    Rebound,
    Watch,
}

impl Strategy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "rebound" | "pullback" | "oversold" => Some(Strategy::Rebound),
            "watch" => Some(Strategy::Watch),
            _ => None,
        }
    }
}

/// Indicator a rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorKind {
    Rsi,
    Mfi,
    Cmf,
    Macd,
    Bollinger,
    Ema,
}

impl IndicatorKind {
    pub fn name(&self) -> &'static str {
        match self {
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Mfi => "MFI",
            IndicatorKind::Cmf => "CMF",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::Bollinger => "Bollinger Bands",
            IndicatorKind::Ema => "EMA",
        }
    }
}

/// Entry of the scoring rule table, evaluated in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    BollingerBreach,
    RsiOversold,
    MfiAccumulation,
    MfiOverheated,
    TrendUp,
    MacdBullishCross,
    CmfInflow,
    CmfOutflow,
}

impl Rule {
    pub const ALL: [Rule; 8] = [
        Rule::BollingerBreach,
        Rule::RsiOversold,
        Rule::MfiAccumulation,
        Rule::MfiOverheated,
        Rule::TrendUp,
        Rule::MacdBullishCross,
        Rule::CmfInflow,
        Rule::CmfOutflow,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bollinger_breach" => Some(Rule::BollingerBreach),
            "rsi_oversold" => Some(Rule::RsiOversold),
            "mfi_accumulation" => Some(Rule::MfiAccumulation),
            "mfi_overheated" => Some(Rule::MfiOverheated),
            "trend_up" => Some(Rule::TrendUp),
            "macd_bullish_cross" => Some(Rule::MacdBullishCross),
            "cmf_inflow" => Some(Rule::CmfInflow),
            "cmf_outflow" => Some(Rule::CmfOutflow),
            _ => None,
        }
    }

    /// Score contribution when the predicate holds.
    pub fn weight(&self) -> i32 {
        match self {
            Rule::BollingerBreach => 2,
            Rule::RsiOversold => 1,
            Rule::MfiAccumulation => 2,
            Rule::MfiOverheated => -2,
            Rule::TrendUp => 1,
            Rule::MacdBullishCross => 1,
            Rule::CmfInflow => 1,
            Rule::CmfOutflow => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rule::BollingerBreach => "breached lower band",
            Rule::RsiOversold => "RSI oversold",
            Rule::MfiAccumulation => "money-flow accumulation",
            Rule::MfiOverheated => "money-flow overheated",
            Rule::TrendUp => "uptrend pullback",
            Rule::MacdBullishCross => "MACD bullish cross",
            Rule::CmfInflow => "net inflow",
            Rule::CmfOutflow => "net outflow",
        }
    }

    pub fn indicator(&self) -> IndicatorKind {
        match self {
            Rule::BollingerBreach => IndicatorKind::Bollinger,
            Rule::RsiOversold => IndicatorKind::Rsi,
            Rule::MfiAccumulation | Rule::MfiOverheated => IndicatorKind::Mfi,
            Rule::TrendUp => IndicatorKind::Ema,
            Rule::MacdBullishCross => IndicatorKind::Macd,
            Rule::CmfInflow | Rule::CmfOutflow => IndicatorKind::Cmf,
        }
    }
}

/// Scored scan row for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub symbol: String,
    pub price: f64,
    /// Change against the previous close, in percent.
    pub change_pct: f64,
    pub score: i32,
    pub rating: Rating,
    pub strategy: Strategy,
    /// Labels of the rules that fired, in rule-table order.
    pub signals: Vec<String>,
    pub indicators: IndicatorSnapshot,
}

impl ScoreResult {
    /// A row with nothing to report: zero score and no labels.
    pub fn is_quiet(&self) -> bool {
        self.score == 0 && self.signals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_breakpoints() {
        let bp = RatingBreakpoints::default();
        assert_eq!(bp.rate(7), Rating::StrongBuy);
        assert_eq!(bp.rate(5), Rating::StrongBuy);
        assert_eq!(bp.rate(4), Rating::Buy);
        assert_eq!(bp.rate(3), Rating::Buy);
        assert_eq!(bp.rate(2), Rating::Hold);
        assert_eq!(bp.rate(1), Rating::Sell);
        assert_eq!(bp.rate(-3), Rating::Sell);
    }

    #[test]
    fn test_breakpoints_monotonic() {
        let bp = RatingBreakpoints::default();
        let order = |r: Rating| match r {
            Rating::Sell => 0,
            Rating::Hold => 1,
            Rating::Buy => 2,
            Rating::StrongBuy => 3,
        };
        let mut last = order(bp.rate(-50));
        for score in -49..50 {
            let current = order(bp.rate(score));
            assert!(current >= last, "rating dropped at score {}", score);
            last = current;
        }
    }

    #[test]
    fn test_breakpoints_reject_overlap() {
        assert!(RatingBreakpoints::new(5, 3, 1).is_ok());
        assert!(RatingBreakpoints::new(3, 3, 2).is_ok());
        assert!(RatingBreakpoints::new(2, 3, 1).is_err());
        assert!(RatingBreakpoints::new(5, 2, 2).is_err());
    }

    #[test]
    fn test_rule_table_order_and_weights() {
        let weights: Vec<i32> = Rule::ALL.iter().map(|r| r.weight()).collect();
        assert_eq!(weights, vec![2, 1, 2, -2, 1, 1, 1, 0]);
        assert_eq!(Rule::from_str("macd_bullish_cross"), Some(Rule::MacdBullishCross));
        assert_eq!(Rule::from_str("nope"), None);
    }

    #[test]
    fn test_rating_and_strategy_parsing() {
        assert_eq!(Rating::from_str("Strong Buy"), Some(Rating::StrongBuy));
        assert_eq!(Rating::from_str("strong-buy"), Some(Rating::StrongBuy));
        assert_eq!(Rating::from_str("hold"), Some(Rating::Hold));
        assert_eq!(Strategy::from_str("pullback"), Some(Strategy::Rebound));
        assert_eq!(Strategy::from_str("idle"), None);
    }

    #[test]
    fn test_rating_serialization() {
        let json = serde_json::to_string(&Rating::StrongBuy).unwrap();
        assert_eq!(json, "\"strong_buy\"");
    }
}
