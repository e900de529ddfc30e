//! Market data sources.
//!
//! A [`MarketDataSource`] supplies OHLCV columns for batches of symbols plus
//! best-effort descriptive fields and news. The scan pipeline only talks to
//! the trait, so tests can inject failures per batch or per symbol.

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::FetchError;
use crate::types::{Interval, NewsItem, Period, Snapshot};

/// Column-shaped bars for one symbol, exactly as the provider returned them.
///
/// Any cell may be missing; rows are matched up by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBars {
    /// Unix timestamps in milliseconds.
    pub timestamps: Vec<i64>,
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<f64>>,
}

impl RawBars {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Per-symbol outcome of one batch request.
pub type BatchBars = HashMap<String, Result<RawBars, FetchError>>;

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch bars for a batch of symbols in one request.
    ///
    /// `Err` means the whole batch failed; otherwise each requested symbol
    /// should appear in the map with its own outcome.
    async fn fetch_bars(
        &self,
        symbols: &[String],
        period: Period,
        interval: Interval,
    ) -> Result<BatchBars, FetchError>;

    /// Point-in-time descriptive fields.
    async fn fetch_snapshot(&self, symbol: &str) -> Result<Snapshot, FetchError>;

    /// Most recent headlines, newest first.
    async fn fetch_news(&self, symbol: &str, max_results: usize)
        -> Result<Vec<NewsItem>, FetchError>;
}
