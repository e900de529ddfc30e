use serde::{Deserialize, Serialize};

use crate::error::SkipReason;
use crate::types::{Rating, ScoreResult, Strategy};

/// Whether quiet rows (score 0, no signals) are kept in scan output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    ShowAll,
    SignaledOnly,
}

impl Visibility {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" | "show_all" => Some(Visibility::ShowAll),
            "signaled" | "signaled_only" => Some(Visibility::SignaledOnly),
            _ => None,
        }
    }
}

/// Display order for scan results. Ties always break by symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Highest score first.
    #[default]
    ScoreDesc,
    /// Lowest MFI first, then lowest RSI.
    MfiThenRsi,
    RsiAsc,
    /// Biggest decliners first.
    ChangeAsc,
}

impl SortMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "score" | "score_desc" => Some(SortMode::ScoreDesc),
            "mfi" | "mfi_then_rsi" => Some(SortMode::MfiThenRsi),
            "rsi" | "rsi_asc" => Some(SortMode::RsiAsc),
            "change" | "change_asc" => Some(SortMode::ChangeAsc),
            _ => None,
        }
    }
}

/// Predicate applied to scored rows after the scan.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Strategy(Strategy),
    /// Score strictly greater than the value.
    MinScore(i32),
    Rating(Rating),
    /// Case-insensitive substring of the symbol.
    SymbolContains(String),
    HasSignals,
}

/// Caller-supplied scan options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanMode {
    pub visibility: Visibility,
    pub sort: SortMode,
}

impl Default for ScanMode {
    fn default() -> Self {
        Self {
            visibility: Visibility::ShowAll,
            sort: SortMode::ScoreDesc,
        }
    }
}

/// A symbol that produced no result and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Progress of a running scan, reported after each batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    pub batch: usize,
    pub total_batches: usize,
    pub symbols_done: usize,
    pub total_symbols: usize,
}

/// Outcome of one scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// Scored rows in the requested order.
    pub results: Vec<ScoreResult>,
    pub skipped: Vec<SkippedSymbol>,
    /// Quiet rows hidden by the visibility mode.
    pub suppressed: usize,
    pub batches: usize,
}

impl ScanReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}
