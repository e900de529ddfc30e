//! Yahoo Finance API client for historical stock data.
//!
//! Provides OHLCV history, quote summaries and news headlines for stocks
//! and ETFs through the unofficial Yahoo Finance API.

use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{BatchBars, MarketDataSource, RawBars};
use crate::error::FetchError;
use crate::types::{Interval, NewsItem, Period, Snapshot};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

/// Quote summary response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteSummaryResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct QuoteSummaryResult {
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetailModule>,
    financial_data: Option<FinancialDataModule>,
    default_key_statistics: Option<KeyStatisticsModule>,
}

/// Numeric field wrapped as `{"raw": 1.0, "fmt": "1.00"}`; may be `{}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawValue {
    raw: Option<f64>,
}

fn raw(value: &Option<RawValue>) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw).filter(|v| v.is_finite())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PriceModule {
    short_name: Option<String>,
    currency: Option<String>,
    market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SummaryDetailModule {
    previous_close: Option<RawValue>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    fifty_two_week_high: Option<RawValue>,
    fifty_two_week_low: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FinancialDataModule {
    target_mean_price: Option<RawValue>,
    recommendation_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct KeyStatisticsModule {
    short_ratio: Option<RawValue>,
}

/// Search response carrying news.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    news: Vec<SearchNews>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNews {
    title: String,
    link: String,
    publisher: Option<String>,
    provider_publish_time: Option<i64>,
}

/// Normalize symbol for Yahoo Finance API.
/// Yahoo uses hyphens instead of dots for share classes (e.g., BRK-B not BRK.B)
fn normalize_yahoo_symbol(symbol: &str) -> String {
    symbol.to_uppercase().replace('.', "-")
}

/// Endpoint URL with the symbol appended as one percent-encoded path segment.
fn symbol_url(base: &str, symbol: &str) -> Result<Url, FetchError> {
    let mut url = Url::parse(base).map_err(|e| FetchError::Request(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| FetchError::Request(format!("{} cannot take a path", base)))?
        .push(&normalize_yahoo_symbol(symbol));
    Ok(url)
}

/// Convert a chart response into raw columns.
fn parse_chart(data: YahooChartResponse) -> Result<RawBars, FetchError> {
    if let Some(error) = data.chart.error {
        return Err(FetchError::Provider(format!(
            "{} - {}",
            error.code, error.description
        )));
    }

    let result = data
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| FetchError::Parse("No results in response".to_string()))?;

    let timestamps = result
        .timestamp
        .ok_or_else(|| FetchError::Parse("No timestamps in response".to_string()))?;

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Parse("No quote data in response".to_string()))?;

    Ok(RawBars {
        timestamps: timestamps.into_iter().map(|t| t * 1000).collect(),
        open: quote.open.unwrap_or_default(),
        high: quote.high.unwrap_or_default(),
        low: quote.low.unwrap_or_default(),
        close: quote.close.unwrap_or_default(),
        volume: quote.volume.unwrap_or_default(),
    })
}

/// Convert a quote summary response into a snapshot.
fn parse_summary(symbol: &str, data: QuoteSummaryResponse) -> Result<Snapshot, FetchError> {
    if let Some(error) = data.quote_summary.error {
        return Err(FetchError::Provider(format!(
            "{} - {}",
            error.code, error.description
        )));
    }

    let result = data
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| FetchError::Parse("No results in response".to_string()))?;

    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();

    Ok(Snapshot {
        symbol: symbol.to_uppercase(),
        short_name: price.short_name,
        currency: price.currency,
        previous_close: raw(&detail.previous_close),
        market_cap: raw(&price.market_cap),
        trailing_pe: raw(&detail.trailing_pe),
        target_mean_price: raw(&financial.target_mean_price),
        recommendation_key: financial.recommendation_key.filter(|k| k != "none"),
        short_ratio: raw(&stats.short_ratio),
        fifty_two_week_high: raw(&detail.fifty_two_week_high),
        fifty_two_week_low: raw(&detail.fifty_two_week_low),
    })
}

/// Collect per-symbol outcomes; a batch where every request failed in
/// transport is reported as a batch failure.
fn collect_batch(results: Vec<(String, Result<RawBars, FetchError>)>) -> Result<BatchBars, FetchError> {
    let transport_failures = results
        .iter()
        .filter(|(_, r)| matches!(r, Err(FetchError::Request(_))))
        .count();

    if !results.is_empty() && transport_failures == results.len() {
        return Err(FetchError::Request(format!(
            "all {} requests in batch failed",
            results.len()
        )));
    }

    Ok(results.into_iter().collect())
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self { client }
    }

    /// Fetch raw OHLCV columns for one symbol.
    pub async fn get_chart(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<RawBars, FetchError> {
        let url = symbol_url(CHART_URL, symbol)?;
        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self
            .client
            .get(url)
            .query(&[
                ("range", period.as_str()),
                ("interval", interval.as_str()),
                ("includePrePost", "false"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let data: YahooChartResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        parse_chart(data)
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    async fn fetch_bars(
        &self,
        symbols: &[String],
        period: Period,
        interval: Interval,
    ) -> Result<BatchBars, FetchError> {
        let requests = symbols.iter().map(|symbol| async move {
            let result = self.get_chart(symbol, period, interval).await;
            if let Err(e) = &result {
                debug!("Chart request for {} failed: {}", symbol, e);
            }
            (symbol.clone(), result)
        });

        collect_batch(join_all(requests).await)
    }

    async fn fetch_snapshot(&self, symbol: &str) -> Result<Snapshot, FetchError> {
        let response = self
            .client
            .get(symbol_url(SUMMARY_URL, symbol)?)
            .query(&[(
                "modules",
                "price,summaryDetail,financialData,defaultKeyStatistics",
            )])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let data: QuoteSummaryResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        parse_summary(symbol, data)
    }

    async fn fetch_news(
        &self,
        symbol: &str,
        max_results: usize,
    ) -> Result<Vec<NewsItem>, FetchError> {
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("q", normalize_yahoo_symbol(symbol)),
                ("quotesCount", "0".to_string()),
                ("newsCount", max_results.to_string()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let data: SearchResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        let mut news: Vec<NewsItem> = data
            .news
            .into_iter()
            .map(|n| NewsItem {
                title: n.title,
                url: n.link,
                source: n.publisher,
                published_at: n.provider_publish_time.map(|t| t * 1000),
            })
            .collect();
        news.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        news.truncate(max_results);

        Ok(news)
    }
}
