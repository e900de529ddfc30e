//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use screener::error::FetchError;
use screener::sources::{BatchBars, MarketDataSource, RawBars};
use screener::types::{Interval, NewsItem, Period, Snapshot};

/// In-memory data source with scripted failures.
#[derive(Default)]
pub struct MockSource {
    /// Per-symbol responses; unknown symbols get a 404.
    pub series: HashMap<String, Result<RawBars, FetchError>>,
    /// Any batch containing one of these symbols fails as a whole.
    pub failing: Vec<String>,
    /// `None` makes snapshot requests fail.
    pub snapshot: Option<Snapshot>,
    /// `None` makes news requests fail.
    pub news: Option<Vec<NewsItem>>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: &str, raw: RawBars) -> Self {
        self.series.insert(symbol.to_string(), Ok(raw));
        self
    }

    pub fn with_error(mut self, symbol: &str, error: FetchError) -> Self {
        self.series.insert(symbol.to_string(), Err(error));
        self
    }

    pub fn failing_batch_with(mut self, symbol: &str) -> Self {
        self.failing.push(symbol.to_string());
        self
    }

    /// Number of `fetch_bars` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for MockSource {
    async fn fetch_bars(
        &self,
        symbols: &[String],
        _period: Period,
        _interval: Interval,
    ) -> Result<BatchBars, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if symbols.iter().any(|s| self.failing.contains(s)) {
            return Err(FetchError::Request("connection reset".to_string()));
        }

        Ok(symbols
            .iter()
            .map(|s| {
                let outcome = self
                    .series
                    .get(s)
                    .cloned()
                    .unwrap_or(Err(FetchError::Status(404)));
                (s.clone(), outcome)
            })
            .collect())
    }

    async fn fetch_snapshot(&self, symbol: &str) -> Result<Snapshot, FetchError> {
        self.snapshot
            .clone()
            .map(|s| Snapshot {
                symbol: symbol.to_string(),
                ..s
            })
            .ok_or_else(|| FetchError::Status(500))
    }

    async fn fetch_news(
        &self,
        _symbol: &str,
        max_results: usize,
    ) -> Result<Vec<NewsItem>, FetchError> {
        self.news
            .clone()
            .map(|mut n| {
                n.truncate(max_results);
                n
            })
            .ok_or_else(|| FetchError::Parse("unexpected body".to_string()))
    }
}

/// Raw columns with the given closes, a one-point range and constant volume.
pub fn raw_from_closes(closes: &[f64]) -> RawBars {
    RawBars {
        timestamps: (0..closes.len() as i64)
            .map(|i| 1_700_000_000_000 + i * 86_400_000)
            .collect(),
        open: closes.iter().map(|&c| Some(c)).collect(),
        high: closes.iter().map(|&c| Some(c + 1.0)).collect(),
        low: closes.iter().map(|&c| Some(c - 1.0)).collect(),
        close: closes.iter().map(|&c| Some(c)).collect(),
        volume: vec![Some(1_000_000.0); closes.len()],
    }
}

pub fn falling(count: usize) -> RawBars {
    let closes: Vec<f64> = (0..count).map(|i| 100.0 - i as f64).collect();
    raw_from_closes(&closes)
}

pub fn rising(count: usize) -> RawBars {
    let closes: Vec<f64> = (0..count).map(|i| 100.0 + i as f64).collect();
    raw_from_closes(&closes)
}
