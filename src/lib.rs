//! Screener - equity scan-and-score server

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use std::sync::Arc;

use config::Config;
use services::Scanner;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scanner: Arc<Scanner>,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn sources::MarketDataSource>) -> Self {
        let scanner = Scanner::new(source, config.scan.clone(), config.detail.clone());
        Self {
            config: Arc::new(config),
            scanner: Arc::new(scanner),
        }
    }
}

// Re-export commonly used types
pub use types::*;
