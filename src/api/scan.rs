//! Scan API endpoints.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ApiResponse;
use crate::error::{AppError, Result};
use crate::services::apply_filters;
use crate::types::{
    parse_tickers, Filter, Rating, ScanMode, ScanReport, SortMode, Strategy, Universe, Visibility,
};
use crate::AppState;

/// Query parameters for the scan endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanQuery {
    /// Universe name: curated or nasdaq100.
    pub universe: Option<String>,
    /// Free-text ticker list; overrides `universe`.
    pub tickers: Option<String>,
    /// score, mfi, rsi or change.
    pub sort: Option<String>,
    /// all or signaled.
    pub visibility: Option<String>,
    pub strategy: Option<String>,
    pub min_score: Option<i32>,
    pub rating: Option<String>,
    /// Symbol search.
    pub q: Option<String>,
}

/// Scan response payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanData {
    pub universe: &'static str,
    pub visibility: Visibility,
    pub sort: SortMode,
    /// Tickers requested.
    pub requested: usize,
    #[serde(flatten)]
    pub report: ScanReport,
}

/// A built-in universe and its tickers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniverseInfo {
    pub name: &'static str,
    pub default_visibility: Visibility,
    pub tickers: Vec<String>,
}

/// Create the scan router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/universes", get(get_universes))
        .route("/api/scan", get(run_scan))
}

fn parse_param<T>(name: &str, value: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Result<Option<T>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse(v)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid {}: {}", name, v))),
        None => Ok(None),
    }
}

impl ScanQuery {
    fn universe(&self, default: &Universe) -> Universe {
        if let Some(tickers) = self.tickers.as_deref().filter(|t| !t.trim().is_empty()) {
            return Universe::Custom(parse_tickers(tickers));
        }
        match self.universe.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(name) => Universe::from_str(name),
            None => default.clone(),
        }
    }

    fn filters(&self) -> Result<Vec<Filter>> {
        let mut filters = Vec::new();
        if let Some(strategy) = parse_param("strategy", self.strategy.as_deref(), Strategy::from_str)? {
            filters.push(Filter::Strategy(strategy));
        }
        if let Some(min) = self.min_score {
            filters.push(Filter::MinScore(min));
        }
        if let Some(rating) = parse_param("rating", self.rating.as_deref(), Rating::from_str)? {
            filters.push(Filter::Rating(rating));
        }
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            filters.push(Filter::SymbolContains(q.to_string()));
        }
        Ok(filters)
    }
}

/// List the built-in universes.
async fn get_universes() -> Json<ApiResponse<Vec<UniverseInfo>>> {
    let universes = [Universe::Curated, Universe::Nasdaq100]
        .into_iter()
        .map(|u| UniverseInfo {
            name: u.name(),
            default_visibility: u.default_visibility(),
            tickers: u.tickers(),
        })
        .collect();
    Json(ApiResponse::new(universes))
}

/// Scan a universe and return ranked, filtered results.
async fn run_scan(
    State(state): State<AppState>,
    Query(query): Query<ScanQuery>,
) -> Result<Json<ApiResponse<ScanData>>> {
    let universe = query.universe(&state.config.universe);
    let tickers = universe.tickers();
    if tickers.is_empty() {
        return Err(AppError::BadRequest("No tickers to scan".to_string()));
    }

    let visibility = parse_param("visibility", query.visibility.as_deref(), Visibility::from_str)?
        .unwrap_or_else(|| state.config.visibility_for(&universe));
    let sort = parse_param("sort", query.sort.as_deref(), SortMode::from_str)?.unwrap_or_default();
    let filters = query.filters()?;

    info!("Scanning {} tickers ({})", tickers.len(), universe.name());

    let mode = ScanMode { visibility, sort };
    let mut report = state
        .scanner
        .scan(&tickers, &mode, |p| {
            debug!("Scan progress: batch {} of {}", p.batch, p.total_batches)
        })
        .await;

    if !filters.is_empty() {
        report.results = apply_filters(&report.results, &filters);
    }

    Ok(Json(ApiResponse::new(ScanData {
        universe: universe.name(),
        visibility,
        sort,
        requested: tickers.len(),
        report,
    })))
}
