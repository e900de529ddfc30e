//! Batched retrieval and normalization of bar series.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::SkipReason;
use crate::services::cache::{Clock, SystemClock, TtlCache};
use crate::sources::{BatchBars, MarketDataSource, RawBars};
use crate::types::{Bar, Interval, Period, ScanProgress, SymbolSeries};

/// Cache key for one batch request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub symbols: Vec<String>,
    pub period: Period,
    pub interval: Interval,
}

/// Per-symbol fetch outcome.
pub type FetchOutcome = (String, Result<SymbolSeries, SkipReason>);

/// Turn provider columns into a clean series.
///
/// Rows with any missing or non-finite field are dropped.
pub fn normalize(symbol: &str, raw: RawBars) -> Result<SymbolSeries, SkipReason> {
    let len = raw.len();
    let columns = [&raw.open, &raw.high, &raw.low, &raw.close, &raw.volume];
    if columns.iter().any(|c| c.len() != len) {
        return Err(SkipReason::Malformed {
            message: format!("column lengths differ from {} timestamps", len),
        });
    }

    let bars: Vec<Bar> = (0..len)
        .filter_map(|i| {
            Some(Bar {
                time: raw.timestamps[i],
                open: raw.open[i]?,
                high: raw.high[i]?,
                low: raw.low[i]?,
                close: raw.close[i]?,
                volume: raw.volume[i]?,
            })
        })
        .filter(Bar::is_finite)
        .collect();

    SymbolSeries::new(symbol, bars).ok_or(SkipReason::NoData)
}

/// Minimum-history gate.
pub fn check_history(series: &SymbolSeries, min_bars: usize) -> Result<(), SkipReason> {
    if series.len() < min_bars {
        return Err(SkipReason::InsufficientHistory {
            bars: series.len(),
            required: min_bars,
        });
    }
    Ok(())
}

/// Bars of the symbols in a batch that the source answered successfully.
type CachedBatch = HashMap<String, RawBars>;

/// Partitions symbols into batches and reads them through a TTL cache.
pub struct BatchFetcher {
    source: Arc<dyn MarketDataSource>,
    cache: TtlCache<FetchKey, Arc<CachedBatch>, Arc<dyn Clock>>,
    batch_size: usize,
}

impl BatchFetcher {
    pub fn new(source: Arc<dyn MarketDataSource>, batch_size: usize, cache_ttl: Duration) -> Self {
        Self::with_clock(source, batch_size, cache_ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Arc<dyn MarketDataSource>,
        batch_size: usize,
        cache_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            cache: TtlCache::with_clock(cache_ttl, clock),
            batch_size: batch_size.max(1),
        }
    }

    pub fn source(&self) -> &Arc<dyn MarketDataSource> {
        &self.source
    }

    /// Number of batches `count` symbols are split into.
    pub fn batch_count(&self, count: usize) -> usize {
        count.div_ceil(self.batch_size)
    }

    /// Fetch one batch, reading through the cache.
    ///
    /// Only symbols that came back with bars are cached. Symbols missing
    /// from a live entry are requested again on every read until it
    /// expires, without extending its lifetime.
    async fn fetch_batch(&self, key: &FetchKey) -> Result<BatchBars, SkipReason> {
        let cached = self.cache.get(key);
        let missing: Vec<String> = key
            .symbols
            .iter()
            .filter(|s| cached.as_ref().map_or(true, |hit| !hit.contains_key(*s)))
            .cloned()
            .collect();

        let mut batch: BatchBars = cached
            .iter()
            .flat_map(|hit| hit.iter())
            .map(|(symbol, raw)| (symbol.clone(), Ok(raw.clone())))
            .collect();

        if missing.is_empty() {
            debug!("Cache hit for batch of {} symbols", key.symbols.len());
            return Ok(batch);
        }

        let response = match self
            .source
            .fetch_bars(&missing, key.period, key.interval)
            .await
        {
            Ok(response) => response,
            Err(e) if batch.is_empty() => return Err(SkipReason::from(e)),
            Err(e) => {
                batch.extend(missing.into_iter().map(|s| (s, Err(e.clone()))));
                return Ok(batch);
            }
        };

        if cached.is_none() {
            let good: CachedBatch = response
                .iter()
                .filter_map(|(symbol, outcome)| {
                    outcome.as_ref().ok().map(|raw| (symbol.clone(), raw.clone()))
                })
                .collect();
            self.cache.cleanup();
            if !good.is_empty() {
                self.cache.set(key.clone(), Arc::new(good));
            }
        }

        batch.extend(response);
        Ok(batch)
    }

    /// Fetch and normalize every symbol, in input order.
    ///
    /// A failing batch marks only its own symbols unavailable. Symbols
    /// shorter than `min_bars` are reported as insufficient history.
    pub async fn fetch<F>(
        &self,
        symbols: &[String],
        period: Period,
        interval: Interval,
        min_bars: usize,
        mut on_progress: F,
    ) -> Vec<FetchOutcome>
    where
        F: FnMut(ScanProgress),
    {
        let total_batches = self.batch_count(symbols.len());
        let mut outcomes = Vec::with_capacity(symbols.len());

        for (index, chunk) in symbols.chunks(self.batch_size).enumerate() {
            let key = FetchKey {
                symbols: chunk.to_vec(),
                period,
                interval,
            };

            match self.fetch_batch(&key).await {
                Ok(batch) => {
                    for symbol in chunk {
                        let outcome = match batch.get(symbol) {
                            Some(Ok(raw)) => normalize(symbol, raw.clone()).and_then(|series| {
                                check_history(&series, min_bars).map(|_| series)
                            }),
                            Some(Err(e)) => Err(SkipReason::from(e.clone())),
                            None => Err(SkipReason::Malformed {
                                message: "symbol missing from batch response".to_string(),
                            }),
                        };
                        if let Err(reason) = &outcome {
                            debug!("Skipping {}: {}", symbol, reason);
                        }
                        outcomes.push((symbol.clone(), outcome));
                    }
                }
                Err(reason) => {
                    warn!(
                        "Batch {} of {} failed ({} symbols): {}",
                        index + 1,
                        total_batches,
                        chunk.len(),
                        reason
                    );
                    outcomes.extend(chunk.iter().map(|s| (s.clone(), Err(reason.clone()))));
                }
            }

            info!("Fetched batch {} of {}", index + 1, total_batches);
            on_progress(ScanProgress {
                batch: index + 1,
                total_batches,
                symbols_done: outcomes.len(),
                total_symbols: symbols.len(),
            });
        }

        outcomes
    }

    /// Fetch a single symbol outside the batch pipeline.
    pub async fn fetch_one(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<SymbolSeries, SkipReason> {
        let symbols = [symbol.to_string()];
        self.fetch(&symbols, period, interval, 1, |_| {})
            .await
            .pop()
            .map(|(_, outcome)| outcome)
            .unwrap_or(Err(SkipReason::NoData))
    }

    pub fn cached_batches(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(closes: &[Option<f64>]) -> RawBars {
        let n = closes.len();
        RawBars {
            timestamps: (0..n as i64).map(|i| i * 86_400_000).collect(),
            open: closes.to_vec(),
            high: closes.iter().map(|c| c.map(|v| v + 1.0)).collect(),
            low: closes.iter().map(|c| c.map(|v| v - 1.0)).collect(),
            close: closes.to_vec(),
            volume: vec![Some(1000.0); n],
        }
    }

    #[test]
    fn test_normalize_drops_incomplete_rows() {
        let series = normalize("AAPL", raw(&[Some(10.0), None, Some(12.0)])).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.last_close(), 12.0);
        assert_eq!(series.previous_close(), Some(10.0));
    }

    #[test]
    fn test_normalize_drops_non_finite_rows() {
        let series = normalize("AAPL", raw(&[Some(10.0), Some(f64::NAN), Some(12.0)])).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_normalize_all_missing() {
        assert_eq!(normalize("AAPL", raw(&[None, None])), Err(SkipReason::NoData));
        assert_eq!(normalize("AAPL", RawBars::default()), Err(SkipReason::NoData));
    }

    #[test]
    fn test_normalize_mismatched_columns() {
        let mut bars = raw(&[Some(10.0), Some(11.0)]);
        bars.volume.pop();
        assert!(matches!(
            normalize("AAPL", bars),
            Err(SkipReason::Malformed { .. })
        ));
    }

    #[test]
    fn test_history_gate() {
        let series = normalize("AAPL", raw(&vec![Some(10.0); 10])).unwrap();
        assert_eq!(
            check_history(&series, 20),
            Err(SkipReason::InsufficientHistory {
                bars: 10,
                required: 20
            })
        );
        assert!(check_history(&series, 10).is_ok());
    }
}
