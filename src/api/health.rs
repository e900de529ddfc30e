use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// Universe scanned when a request names none.
    universe: &'static str,
    /// Batch responses currently held by the fetch cache.
    cached_batches: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        universe: state.config.universe.name(),
        cached_batches: state.scanner.fetcher().cached_batches(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sources::YahooFinanceClient;
    use std::sync::Arc;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok",
            version: "1.0.0",
            universe: "curated",
            cached_batches: 2,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"cachedBatches\":2"));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let state = AppState::new(Config::default(), Arc::new(YahooFinanceClient::new()));
        let Json(response) = health(State(state)).await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(response.universe, "curated");
        assert_eq!(response.cached_batches, 0);
    }
}
