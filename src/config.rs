use std::env;
use std::time::Duration;

use tracing::warn;

use crate::types::{Interval, Period, RatingBreakpoints, Rule, Universe, Visibility};

/// Cutoffs for the scoring rule table.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleThresholds {
    /// RSI strictly below this is oversold.
    pub rsi_oversold: f64,
    /// MFI strictly below this is accumulation.
    pub mfi_accumulation: f64,
    /// MFI strictly above this is overheated.
    pub mfi_overheated: f64,
    /// CMF strictly above this is net inflow.
    pub cmf_inflow: f64,
    /// CMF strictly below this is net outflow.
    pub cmf_outflow: f64,
    /// Period of the trend EMA.
    pub trend_ema_period: usize,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            rsi_oversold: 35.0,
            mfi_accumulation: 25.0,
            mfi_overheated: 80.0,
            cmf_inflow: 0.05,
            cmf_outflow: -0.05,
            trend_ema_period: 50,
        }
    }
}

/// Rule table, thresholds and rating breakpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Active rules, evaluated in table order.
    pub rules: Vec<Rule>,
    pub thresholds: RuleThresholds,
    pub breakpoints: RatingBreakpoints,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rules: Rule::ALL.to_vec(),
            thresholds: RuleThresholds::default(),
            breakpoints: RatingBreakpoints::default(),
        }
    }
}

/// Scan pipeline settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Symbols per data-source request.
    pub batch_size: usize,
    pub period: Period,
    pub interval: Interval,
    /// Symbols with fewer valid bars are never scored.
    pub min_bars: usize,
    /// Lifetime of cached batch responses.
    pub cache_ttl: Duration,
    /// Overrides the universe's default visibility when set.
    pub visibility: Option<Visibility>,
    pub scoring: ScoringConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: 25,
            period: Period::ThreeMonths,
            interval: Interval::OneDay,
            min_bars: 50,
            cache_ttl: Duration::from_secs(600),
            visibility: None,
            scoring: ScoringConfig::default(),
        }
    }
}

/// Deep-dive view settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailConfig {
    pub period: Period,
    pub interval: Interval,
    pub news_limit: usize,
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            period: Period::SixMonths,
            interval: Interval::OneDay,
            news_limit: 5,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Universe scanned when a request names none.
    pub universe: Universe,
    pub scan: ScanConfig,
    pub detail: DetailConfig,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse a comma-separated rule list, ignoring unknown names.
fn parse_rules(s: &str) -> Vec<Rule> {
    let mut rules = Vec::new();
    for name in s.split(',').filter(|n| !n.trim().is_empty()) {
        match Rule::from_str(name) {
            Some(rule) if !rules.contains(&rule) => rules.push(rule),
            Some(_) => {}
            None => warn!("Ignoring unknown scan rule '{}'", name.trim()),
        }
    }
    // Table order, regardless of how the list was written.
    rules.sort_by_key(|r| Rule::ALL.iter().position(|a| a == r));
    rules
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let universe = match env::var("SCAN_TICKERS") {
            Ok(list) if !list.trim().is_empty() => Universe::Custom(crate::types::parse_tickers(&list)),
            _ => env::var("SCAN_UNIVERSE")
                .map(|s| Universe::from_str(&s))
                .unwrap_or(Universe::Curated),
        };

        let defaults = RuleThresholds::default();
        let thresholds = RuleThresholds {
            rsi_oversold: env_parse("RSI_OVERSOLD").unwrap_or(defaults.rsi_oversold),
            mfi_accumulation: env_parse("MFI_ACCUMULATION").unwrap_or(defaults.mfi_accumulation),
            mfi_overheated: env_parse("MFI_OVERHEATED").unwrap_or(defaults.mfi_overheated),
            cmf_inflow: env_parse("CMF_INFLOW").unwrap_or(defaults.cmf_inflow),
            cmf_outflow: env_parse("CMF_OUTFLOW").unwrap_or(defaults.cmf_outflow),
            trend_ema_period: env_parse("TREND_EMA_PERIOD")
                .filter(|p: &usize| *p > 0)
                .unwrap_or(defaults.trend_ema_period),
        };

        let default_bp = RatingBreakpoints::default();
        let breakpoints = RatingBreakpoints::new(
            env_parse("RATING_STRONG_BUY").unwrap_or(default_bp.strong_buy),
            env_parse("RATING_BUY").unwrap_or(default_bp.buy),
            env_parse("RATING_SELL").unwrap_or(default_bp.sell),
        )
        .unwrap_or_else(|e| {
            warn!("{}; using defaults", e);
            default_bp
        });

        let rules = env::var("SCAN_RULES")
            .map(|s| parse_rules(&s))
            .ok()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| Rule::ALL.to_vec());

        let scan_defaults = ScanConfig::default();
        let scan = ScanConfig {
            batch_size: env_parse("SCAN_BATCH_SIZE")
                .filter(|b: &usize| *b > 0)
                .unwrap_or(scan_defaults.batch_size),
            period: env::var("SCAN_PERIOD")
                .ok()
                .and_then(|s| Period::from_str(&s))
                .unwrap_or(scan_defaults.period),
            interval: env::var("SCAN_INTERVAL")
                .ok()
                .and_then(|s| Interval::from_str(&s))
                .unwrap_or(scan_defaults.interval),
            min_bars: env_parse("SCAN_MIN_BARS")
                .filter(|m: &usize| *m >= 2)
                .unwrap_or(scan_defaults.min_bars),
            cache_ttl: env_parse("FETCH_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(scan_defaults.cache_ttl),
            visibility: env::var("SCAN_VISIBILITY")
                .ok()
                .and_then(|s| Visibility::from_str(&s)),
            scoring: ScoringConfig {
                rules,
                thresholds,
                breakpoints,
            },
        };

        let detail_defaults = DetailConfig::default();
        let detail = DetailConfig {
            period: env::var("DETAIL_PERIOD")
                .ok()
                .and_then(|s| Period::from_str(&s))
                .unwrap_or(detail_defaults.period),
            interval: env::var("DETAIL_INTERVAL")
                .ok()
                .and_then(|s| Interval::from_str(&s))
                .unwrap_or(detail_defaults.interval),
            news_limit: env_parse("NEWS_LIMIT").unwrap_or(detail_defaults.news_limit),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("PORT").unwrap_or(3001),
            universe,
            scan,
            detail,
        }
    }

    /// Visibility for a scan over `universe`.
    pub fn visibility_for(&self, universe: &Universe) -> Visibility {
        self.scan
            .visibility
            .unwrap_or_else(|| universe.default_visibility())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            universe: Universe::Curated,
            scan: ScanConfig::default(),
            detail: DetailConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_defaults() {
        let scan = ScanConfig::default();
        assert_eq!(scan.batch_size, 25);
        assert_eq!(scan.period, Period::ThreeMonths);
        assert_eq!(scan.interval, Interval::OneDay);
        assert_eq!(scan.min_bars, 50);
        assert_eq!(scan.cache_ttl, Duration::from_secs(600));
        assert!(scan.visibility.is_none());
        assert_eq!(scan.scoring.rules.len(), 8);
    }

    #[test]
    fn test_threshold_defaults() {
        let t = RuleThresholds::default();
        assert_eq!(t.rsi_oversold, 35.0);
        assert_eq!(t.mfi_accumulation, 25.0);
        assert_eq!(t.mfi_overheated, 80.0);
        assert_eq!(t.cmf_inflow, 0.05);
        assert_eq!(t.cmf_outflow, -0.05);
        assert_eq!(t.trend_ema_period, 50);
    }

    #[test]
    fn test_detail_defaults() {
        let detail = DetailConfig::default();
        assert_eq!(detail.period, Period::SixMonths);
        assert_eq!(detail.news_limit, 5);
    }

    #[test]
    fn test_parse_rules_keeps_table_order() {
        let rules = parse_rules("cmf_inflow, rsi_oversold,bogus,rsi_oversold");
        assert_eq!(rules, vec![Rule::RsiOversold, Rule::CmfInflow]);
    }

    #[test]
    fn test_parse_rules_empty() {
        assert!(parse_rules("").is_empty());
        assert!(parse_rules(" , ").is_empty());
    }

    #[test]
    fn test_visibility_override() {
        let mut config = Config::default();
        assert_eq!(config.visibility_for(&Universe::Nasdaq100), Visibility::SignaledOnly);
        assert_eq!(config.visibility_for(&Universe::Curated), Visibility::ShowAll);

        config.scan.visibility = Some(Visibility::ShowAll);
        assert_eq!(config.visibility_for(&Universe::Nasdaq100), Visibility::ShowAll);
    }
}
