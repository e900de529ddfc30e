use serde::Serialize;

use crate::types::Visibility;

/// Core large-cap tech names scanned in fast mode.
pub const CURATED_TICKERS: [&str; 10] = [
    "NVDA", "AAPL", "MSFT", "AMZN", "GOOGL", "META", "TSLA", "AMD", "AVGO", "TSM",
];

/// Nasdaq-100 constituents.
pub const NASDAQ_100_TICKERS: [&str; 100] = [
    "AAPL", "MSFT", "NVDA", "AVGO", "AMZN", "META", "TSLA", "GOOGL", "GOOG", "COST",
    "NFLX", "AMD", "PEP", "LIN", "CSCO", "TMUS", "ADBE", "QCOM", "TXN", "INTU",
    "AMGN", "ISRG", "CMCSA", "HON", "BKNG", "AMAT", "KKR", "VRTX", "SBUX", "PANW",
    "MU", "ADP", "PDD", "GILD", "INTC", "LRCX", "ADI", "MELI", "MDLZ", "CTAS",
    "REGN", "KLAC", "CRWD", "SNPS", "SHW", "PYPL", "MAR", "CDNS", "CSX", "ORLY",
    "ASML", "NXPI", "CEG", "MNST", "DASH", "ROP", "FTNT", "PCAR", "CHTR", "ABNB",
    "AEP", "CPRT", "DXCM", "MCHP", "ROST", "PAYX", "FAST", "CTSH", "ODFL", "KDP",
    "IDXX", "EA", "EXC", "VRSK", "GEHC", "XEL", "AZN", "BKR", "GFS", "LULU",
    "TTD", "FANG", "WBD", "CSGP", "MRVL", "BIIB", "TEAM", "ILMN", "DDOG", "ZS",
    "ON", "MDB", "ANSS", "DLTR", "WBA", "SIRI", "ZM", "ENPH", "JD", "LCID",
];

/// Set of tickers a scan runs over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "tickers")]
pub enum Universe {
    Curated,
    Nasdaq100,
    /// Free-text ticker entry.
    Custom(Vec<String>),
}

impl Universe {
    /// Parse a universe name. Unknown names are treated as a ticker list.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "curated" | "mag7" => Universe::Curated,
            "nasdaq100" | "ndx" => Universe::Nasdaq100,
            _ => Universe::Custom(parse_tickers(s)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Universe::Curated => "curated",
            Universe::Nasdaq100 => "nasdaq100",
            Universe::Custom(_) => "custom",
        }
    }

    pub fn tickers(&self) -> Vec<String> {
        match self {
            Universe::Curated => CURATED_TICKERS.iter().map(|s| s.to_string()).collect(),
            Universe::Nasdaq100 => NASDAQ_100_TICKERS.iter().map(|s| s.to_string()).collect(),
            Universe::Custom(tickers) => tickers.clone(),
        }
    }

    /// Large universes hide quiet rows; small hand-picked ones show everything.
    pub fn default_visibility(&self) -> Visibility {
        match self {
            Universe::Nasdaq100 => Visibility::SignaledOnly,
            Universe::Curated | Universe::Custom(_) => Visibility::ShowAll,
        }
    }
}

/// Split free text into upper-cased tickers, keeping first-seen order.
pub fn parse_tickers(text: &str) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    for raw in text.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
        let ticker = raw.trim().to_uppercase();
        if ticker.is_empty() || tickers.contains(&ticker) {
            continue;
        }
        tickers.push(ticker);
    }
    tickers
}
