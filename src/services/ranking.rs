//! Sorting and filtering of scan results.

use std::cmp::Ordering;

use crate::types::{Filter, ScoreResult, SortMode};

/// Ascending order with missing values last.
fn cmp_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare(a: &ScoreResult, b: &ScoreResult, mode: SortMode) -> Ordering {
    let primary = match mode {
        SortMode::ScoreDesc => b.score.cmp(&a.score),
        SortMode::MfiThenRsi => cmp_missing_last(a.indicators.mfi, b.indicators.mfi)
            .then_with(|| cmp_missing_last(a.indicators.rsi, b.indicators.rsi)),
        SortMode::RsiAsc => cmp_missing_last(a.indicators.rsi, b.indicators.rsi),
        SortMode::ChangeAsc => a.change_pct.total_cmp(&b.change_pct),
    };
    primary.then_with(|| a.symbol.cmp(&b.symbol))
}

/// Sort results in place. Ties break by symbol, so the order is total.
pub fn rank(results: &mut [ScoreResult], mode: SortMode) {
    results.sort_by(|a, b| compare(a, b, mode));
}

impl Filter {
    pub fn matches(&self, result: &ScoreResult) -> bool {
        match self {
            Filter::Strategy(strategy) => result.strategy == *strategy,
            Filter::MinScore(min) => result.score > *min,
            Filter::Rating(rating) => result.rating == *rating,
            Filter::SymbolContains(needle) => result
                .symbol
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Filter::HasSignals => !result.signals.is_empty(),
        }
    }
}

/// Rows matching every filter, in their existing order.
pub fn apply_filters(results: &[ScoreResult], filters: &[Filter]) -> Vec<ScoreResult> {
    results
        .iter()
        .filter(|r| filters.iter().all(|f| f.matches(r)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IndicatorSnapshot, Rating, Strategy};

    fn result(symbol: &str, score: i32, mfi: Option<f64>, rsi: Option<f64>, change: f64) -> ScoreResult {
        ScoreResult {
            symbol: symbol.to_string(),
            price: 100.0,
            change_pct: change,
            score,
            rating: Rating::Hold,
            strategy: Strategy::Watch,
            signals: Vec::new(),
            indicators: IndicatorSnapshot {
                mfi,
                rsi,
                ..IndicatorSnapshot::default()
            },
        }
    }

    fn symbols(results: &[ScoreResult]) -> Vec<&str> {
        results.iter().map(|r| r.symbol.as_str()).collect()
    }

    #[test]
    fn test_score_desc_ties_by_symbol() {
        let mut results = vec![
            result("MSFT", 2, None, None, 0.0),
            result("AAPL", 2, None, None, 0.0),
            result("NVDA", 5, None, None, 0.0),
        ];
        rank(&mut results, SortMode::ScoreDesc);
        assert_eq!(symbols(&results), vec!["NVDA", "AAPL", "MSFT"]);
    }

    #[test]
    fn test_mfi_then_rsi_missing_last() {
        let mut results = vec![
            result("A", 0, None, Some(10.0), 0.0),
            result("B", 0, Some(20.0), Some(50.0), 0.0),
            result("C", 0, Some(20.0), Some(30.0), 0.0),
            result("D", 0, Some(5.0), None, 0.0),
        ];
        rank(&mut results, SortMode::MfiThenRsi);
        assert_eq!(symbols(&results), vec!["D", "C", "B", "A"]);
    }

    #[test]
    fn test_change_asc() {
        let mut results = vec![
            result("UP", 0, None, None, 3.0),
            result("DOWN", 0, None, None, -4.0),
            result("FLAT", 0, None, None, 0.0),
        ];
        rank(&mut results, SortMode::ChangeAsc);
        assert_eq!(symbols(&results), vec!["DOWN", "FLAT", "UP"]);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let mut results = vec![
            result("B", 1, Some(40.0), Some(30.0), 1.0),
            result("A", 1, Some(40.0), None, -1.0),
            result("C", 3, None, Some(20.0), 0.5),
        ];
        for mode in [
            SortMode::ScoreDesc,
            SortMode::MfiThenRsi,
            SortMode::RsiAsc,
            SortMode::ChangeAsc,
        ] {
            rank(&mut results, mode);
            let once = results.clone();
            rank(&mut results, mode);
            assert_eq!(results, once);
        }
    }

    #[test]
    fn test_filters_borrow_and_combine() {
        let mut hot = result("NVDA", 4, None, None, 0.0);
        hot.strategy = Strategy::Rebound;
        hot.rating = Rating::Buy;
        hot.signals = vec!["RSI oversold".to_string()];
        let results = vec![hot, result("AAPL", 3, None, None, 0.0)];

        let rebound = apply_filters(&results, &[Filter::Strategy(Strategy::Rebound)]);
        assert_eq!(symbols(&rebound), vec!["NVDA"]);

        let strict = apply_filters(&results, &[Filter::MinScore(3)]);
        assert_eq!(symbols(&strict), vec!["NVDA"]);

        let search = apply_filters(&results, &[Filter::SymbolContains("apl".to_string())]);
        assert_eq!(symbols(&search), vec!["AAPL"]);

        let none = apply_filters(&results, &[Filter::HasSignals, Filter::Rating(Rating::Hold)]);
        assert!(none.is_empty());

        assert_eq!(apply_filters(&results, &[]).len(), 2);
        assert_eq!(results.len(), 2);
    }
}
