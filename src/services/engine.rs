//! Signal engine.
//!
//! Scores one symbol's series against the rule table and derives its
//! rating. Every failure is a [`SkipReason`]; nothing here panics.

use crate::config::{RuleThresholds, ScoringConfig};
use crate::error::SkipReason;
use crate::services::fetch::check_history;
use crate::services::indicators;
use crate::types::{IndicatorKind, IndicatorSnapshot, Rule, ScoreResult, Strategy, SymbolSeries};

/// Score, labels and strategy for one indicator snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub score: i32,
    pub signals: Vec<String>,
    pub strategy: Strategy,
}

/// Whether the indicator behind `kind` has a value.
fn is_defined(kind: IndicatorKind, snap: &IndicatorSnapshot) -> bool {
    match kind {
        IndicatorKind::Rsi => snap.rsi.is_some(),
        IndicatorKind::Mfi => snap.mfi.is_some(),
        IndicatorKind::Cmf => snap.cmf.is_some(),
        IndicatorKind::Macd => snap.macd.is_some(),
        IndicatorKind::Bollinger => snap.bollinger.is_some(),
        IndicatorKind::Ema => snap.ema.is_some(),
    }
}

/// Evaluate one rule's predicate. `None` if its indicator is undefined.
fn fires(rule: Rule, price: f64, snap: &IndicatorSnapshot, t: &RuleThresholds) -> Option<bool> {
    let hit = match rule {
        Rule::BollingerBreach => price < snap.bollinger?.lower,
        Rule::RsiOversold => snap.rsi? < t.rsi_oversold,
        Rule::MfiAccumulation => snap.mfi? < t.mfi_accumulation,
        Rule::MfiOverheated => snap.mfi? > t.mfi_overheated,
        Rule::TrendUp => price > snap.ema?,
        Rule::MacdBullishCross => {
            let macd = snap.macd?;
            macd.line > macd.signal
        }
        Rule::CmfInflow => snap.cmf? > t.cmf_inflow,
        Rule::CmfOutflow => snap.cmf? < t.cmf_outflow,
    };
    Some(hit)
}

/// Apply the active rules to a snapshot.
///
/// Rules run in table order whatever order `scoring.rules` lists them in,
/// and a rule listed twice counts once.
pub fn evaluate(
    price: f64,
    snap: &IndicatorSnapshot,
    scoring: &ScoringConfig,
) -> Result<Evaluation, SkipReason> {
    let mut score = 0;
    let mut signals = Vec::new();
    let mut oversold = false;

    let active = Rule::ALL.into_iter().filter(|r| scoring.rules.contains(r));
    for rule in active {
        let hit = fires(rule, price, snap, &scoring.thresholds).ok_or_else(|| {
            SkipReason::IndicatorUndefined {
                indicator: rule.indicator().name().to_string(),
            }
        })?;
        if !hit {
            continue;
        }

        score += rule.weight();
        match rule {
            Rule::BollingerBreach | Rule::RsiOversold => {
                oversold = true;
                signals.push(rule.label().to_string());
            }
            // A trend only reads as a pullback when price is also stretched.
            Rule::TrendUp => {
                if oversold {
                    signals.push(rule.label().to_string());
                }
            }
            _ => signals.push(rule.label().to_string()),
        }
    }

    let strategy = if oversold {
        Strategy::Rebound
    } else {
        Strategy::Watch
    };

    Ok(Evaluation {
        score,
        signals,
        strategy,
    })
}

/// Check that every indicator the active rules read is defined.
pub fn required_indicators(
    snap: &IndicatorSnapshot,
    rules: &[Rule],
) -> Result<(), SkipReason> {
    match rules.iter().find(|r| !is_defined(r.indicator(), snap)) {
        Some(rule) => Err(SkipReason::IndicatorUndefined {
            indicator: rule.indicator().name().to_string(),
        }),
        None => Ok(()),
    }
}

/// Score one symbol.
pub fn score_series(
    series: &SymbolSeries,
    min_bars: usize,
    scoring: &ScoringConfig,
) -> Result<ScoreResult, SkipReason> {
    check_history(series, min_bars)?;

    let price = series.last_close();
    let previous = series
        .previous_close()
        .ok_or(SkipReason::InsufficientHistory {
            bars: series.len(),
            required: 2,
        })?;
    if !(previous.is_finite() && previous > 0.0) {
        return Err(SkipReason::IndicatorUndefined {
            indicator: "percent change".to_string(),
        });
    }
    let change_pct = (price - previous) / previous * 100.0;

    let snap = indicators::snapshot(series.bars(), scoring.thresholds.trend_ema_period);
    required_indicators(&snap, &scoring.rules)?;
    let evaluation = evaluate(price, &snap, scoring)?;

    Ok(ScoreResult {
        symbol: series.symbol().to_string(),
        price,
        change_pct,
        score: evaluation.score,
        rating: scoring.breakpoints.rate(evaluation.score),
        strategy: evaluation.strategy,
        signals: evaluation.signals,
        indicators: snap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::indicators::test_support::*;
    use crate::types::{BandValue, MacdValue, Rating};

    fn full_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi: Some(50.0),
            mfi: Some(50.0),
            cmf: Some(0.0),
            macd: Some(MacdValue {
                line: 0.0,
                signal: 0.0,
                histogram: 0.0,
            }),
            bollinger: Some(BandValue {
                lower: 90.0,
                middle: 100.0,
                upper: 110.0,
            }),
            atr: Some(2.0),
            ema: Some(120.0),
        }
    }

    #[test]
    fn test_quiet_snapshot_scores_zero() {
        let eval = evaluate(100.0, &full_snapshot(), &ScoringConfig::default()).unwrap();
        assert_eq!(eval.score, 0);
        assert!(eval.signals.is_empty());
        assert_eq!(eval.strategy, Strategy::Watch);
    }

    #[test]
    fn test_price_on_lower_band_is_not_a_breach() {
        let eval = evaluate(90.0, &full_snapshot(), &ScoringConfig::default()).unwrap();
        assert!(!eval.signals.iter().any(|s| s == "breached lower band"));
        assert_eq!(eval.score, 0);
    }

    #[test]
    fn test_breach_and_oversold_stack() {
        let snap = IndicatorSnapshot {
            rsi: Some(20.0),
            mfi: Some(15.0),
            cmf: Some(0.2),
            ..full_snapshot()
        };
        let eval = evaluate(85.0, &snap, &ScoringConfig::default()).unwrap();
        assert_eq!(eval.score, 2 + 1 + 2 + 1);
        assert_eq!(
            eval.signals,
            vec![
                "breached lower band",
                "RSI oversold",
                "money-flow accumulation",
                "net inflow"
            ]
        );
        assert_eq!(eval.strategy, Strategy::Rebound);
    }

    #[test]
    fn test_trend_label_needs_oversold() {
        let trending = IndicatorSnapshot {
            ema: Some(80.0),
            ..full_snapshot()
        };
        let eval = evaluate(100.0, &trending, &ScoringConfig::default()).unwrap();
        assert_eq!(eval.score, 1);
        assert!(eval.signals.is_empty());

        let pullback = IndicatorSnapshot {
            rsi: Some(30.0),
            ..trending
        };
        let eval = evaluate(100.0, &pullback, &ScoringConfig::default()).unwrap();
        assert_eq!(eval.score, 2);
        assert_eq!(eval.signals, vec!["RSI oversold", "uptrend pullback"]);
    }

    #[test]
    fn test_rule_order_does_not_matter() {
        let pullback = IndicatorSnapshot {
            rsi: Some(30.0),
            ema: Some(80.0),
            ..full_snapshot()
        };
        let scoring = ScoringConfig {
            rules: vec![Rule::TrendUp, Rule::RsiOversold, Rule::TrendUp],
            ..ScoringConfig::default()
        };
        let eval = evaluate(100.0, &pullback, &scoring).unwrap();
        assert_eq!(eval.score, 2);
        assert_eq!(eval.signals, vec!["RSI oversold", "uptrend pullback"]);
        assert_eq!(eval.strategy, Strategy::Rebound);
    }

    #[test]
    fn test_overheated_and_outflow() {
        let snap = IndicatorSnapshot {
            mfi: Some(90.0),
            cmf: Some(-0.3),
            ..full_snapshot()
        };
        let eval = evaluate(100.0, &snap, &ScoringConfig::default()).unwrap();
        assert_eq!(eval.score, -2);
        assert_eq!(eval.signals, vec!["money-flow overheated", "net outflow"]);
    }

    #[test]
    fn test_macd_cross() {
        let snap = IndicatorSnapshot {
            macd: Some(MacdValue {
                line: 1.0,
                signal: 0.5,
                histogram: 0.5,
            }),
            ..full_snapshot()
        };
        let eval = evaluate(100.0, &snap, &ScoringConfig::default()).unwrap();
        assert_eq!(eval.score, 1);
        assert_eq!(eval.signals, vec!["MACD bullish cross"]);
    }

    #[test]
    fn test_undefined_indicator_skips() {
        let snap = IndicatorSnapshot {
            ema: None,
            ..full_snapshot()
        };
        assert_eq!(
            evaluate(100.0, &snap, &ScoringConfig::default()),
            Err(SkipReason::IndicatorUndefined {
                indicator: "EMA".to_string()
            })
        );

        let scoring = ScoringConfig {
            rules: vec![Rule::RsiOversold],
            ..ScoringConfig::default()
        };
        assert!(evaluate(100.0, &snap, &scoring).is_ok());
    }

    #[test]
    fn test_score_series_uptrend() {
        let series = SymbolSeries::new("UP", uptrend(60)).unwrap();
        let result = score_series(&series, 50, &ScoringConfig::default()).unwrap();
        assert_eq!(result.symbol, "UP");
        assert_eq!(result.price, 100.0 + 59.0 * 1.5);
        assert!(result.change_pct > 0.0);
        assert!(result.indicators.rsi.unwrap() > 35.0);
        assert_eq!(result.strategy, Strategy::Watch);
        assert_eq!(result.rating, ScoringConfig::default().breakpoints.rate(result.score));
    }

    #[test]
    fn test_score_series_below_gate() {
        let series = SymbolSeries::new("SHORT", uptrend(10)).unwrap();
        assert_eq!(
            score_series(&series, 20, &ScoringConfig::default()),
            Err(SkipReason::InsufficientHistory {
                bars: 10,
                required: 20
            })
        );
    }

    #[test]
    fn test_score_series_missing_long_indicators() {
        let series = SymbolSeries::new("MID", uptrend(30)).unwrap();
        let result = score_series(&series, 20, &ScoringConfig::default());
        assert!(matches!(
            result,
            Err(SkipReason::IndicatorUndefined { .. })
        ));
    }

    #[test]
    fn test_score_series_zero_previous_close() {
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        closes[28] = 0.0;
        let series = SymbolSeries::new("ZERO", bars_from_closes(&closes)).unwrap();
        let scoring = ScoringConfig {
            rules: vec![Rule::RsiOversold],
            ..ScoringConfig::default()
        };
        assert_eq!(
            score_series(&series, 20, &scoring),
            Err(SkipReason::IndicatorUndefined {
                indicator: "percent change".to_string()
            })
        );
    }

    #[test]
    fn test_downtrend_rates_from_score() {
        let series = SymbolSeries::new("DOWN", downtrend(60)).unwrap();
        let result = score_series(&series, 50, &ScoringConfig::default()).unwrap();
        assert!(result.signals.contains(&"RSI oversold".to_string()));
        assert_eq!(result.strategy, Strategy::Rebound);
        assert_ne!(result.rating, Rating::StrongBuy);
    }
}
