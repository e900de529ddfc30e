//! Scan pipeline and deep-dive view.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{DetailConfig, ScanConfig};
use crate::error::{AppError, Result};
use crate::services::cache::Clock;
use crate::services::engine::score_series;
use crate::services::fetch::BatchFetcher;
use crate::services::ranking::rank;
use crate::services::trade_plan::trade_plan;
use crate::sources::MarketDataSource;
use crate::types::{
    DetailView, ScanMode, ScanProgress, ScanReport, SkippedSymbol, SymbolSeries, TradePlan,
    Visibility,
};

/// Runs scans over ticker lists and builds detail views.
pub struct Scanner {
    fetcher: BatchFetcher,
    scan: ScanConfig,
    detail: DetailConfig,
}

impl Scanner {
    pub fn new(source: Arc<dyn MarketDataSource>, scan: ScanConfig, detail: DetailConfig) -> Self {
        let fetcher = BatchFetcher::new(source, scan.batch_size, scan.cache_ttl);
        Self {
            fetcher,
            scan,
            detail,
        }
    }

    /// Build a scanner whose fetch cache reads time from `clock`.
    pub fn with_clock(
        source: Arc<dyn MarketDataSource>,
        scan: ScanConfig,
        detail: DetailConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let fetcher = BatchFetcher::with_clock(source, scan.batch_size, scan.cache_ttl, clock);
        Self {
            fetcher,
            scan,
            detail,
        }
    }

    pub fn scan_config(&self) -> &ScanConfig {
        &self.scan
    }

    pub fn fetcher(&self) -> &BatchFetcher {
        &self.fetcher
    }

    /// Fetch, score and rank `tickers`.
    ///
    /// Every ticker ends up either in `results`, in `skipped` with its
    /// reason, or counted in `suppressed`.
    pub async fn scan<F>(&self, tickers: &[String], mode: &ScanMode, on_progress: F) -> ScanReport
    where
        F: FnMut(ScanProgress),
    {
        let outcomes = self
            .fetcher
            .fetch(
                tickers,
                self.scan.period,
                self.scan.interval,
                self.scan.min_bars,
                on_progress,
            )
            .await;

        let mut results = Vec::new();
        let mut skipped = Vec::new();
        let mut suppressed = 0;

        for (symbol, outcome) in outcomes {
            let scored = outcome
                .and_then(|series| score_series(&series, self.scan.min_bars, &self.scan.scoring));
            match scored {
                Ok(result) if mode.visibility == Visibility::SignaledOnly && result.is_quiet() => {
                    suppressed += 1;
                }
                Ok(result) => results.push(result),
                Err(reason) => {
                    debug!("{} skipped: {}", symbol, reason);
                    skipped.push(SkippedSymbol { symbol, reason });
                }
            }
        }

        rank(&mut results, mode.sort);

        info!(
            "Scan complete: {} scored, {} skipped, {} suppressed",
            results.len(),
            skipped.len(),
            suppressed
        );

        ScanReport {
            results,
            skipped,
            suppressed,
            batches: self.fetcher.batch_count(tickers.len()),
        }
    }

    async fn detail_series(&self, symbol: &str) -> Result<SymbolSeries> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(AppError::BadRequest("Symbol is required".to_string()));
        }

        let series = self
            .fetcher
            .fetch_one(&symbol, self.detail.period, self.detail.interval)
            .await?;
        Ok(series)
    }

    /// Trade plan over the detail-period history.
    pub async fn plan(&self, symbol: &str) -> Result<TradePlan> {
        let series = self.detail_series(symbol).await?;
        Ok(trade_plan(&series))
    }

    /// Trade plan, snapshot, news and bars for one symbol.
    ///
    /// Snapshot and news are best effort; their failures leave the fields
    /// empty instead of failing the request.
    pub async fn detail(&self, symbol: &str) -> Result<DetailView> {
        let series = self.detail_series(symbol).await?;
        let symbol = series.symbol().to_string();
        let source = self.fetcher.source();

        let (snapshot, news) = tokio::join!(
            source.fetch_snapshot(&symbol),
            source.fetch_news(&symbol, self.detail.news_limit)
        );

        let snapshot = snapshot
            .map_err(|e| warn!("Snapshot for {} unavailable: {}", symbol, e))
            .ok();
        let news = news.unwrap_or_else(|e| {
            warn!("News for {} unavailable: {}", symbol, e);
            Vec::new()
        });

        Ok(DetailView {
            symbol,
            plan: trade_plan(&series),
            snapshot,
            news,
            bars: series.into_bars(),
        })
    }
}
