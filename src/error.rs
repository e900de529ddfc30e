use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Failure talking to a market data source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error: {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Request(e.to_string())
    }
}

/// Why a symbol produced no scan result.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("fetch failed: {message}")]
    FetchFailed { message: String },

    #[error("malformed response: {message}")]
    Malformed { message: String },

    #[error("no complete bars")]
    NoData,

    #[error("insufficient history: {bars} bars, {required} required")]
    InsufficientHistory { bars: usize, required: usize },

    #[error("{indicator} undefined")]
    IndicatorUndefined { indicator: String },
}

impl From<FetchError> for SkipReason {
    fn from(e: FetchError) -> Self {
        SkipReason::FetchFailed {
            message: e.to_string(),
        }
    }
}

/// Invalid configuration value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("rating breakpoints overlap: strong_buy={strong_buy}, buy={buy}, sell={sell}")]
    Breakpoints { strong_buy: i32, buy: i32, sell: i32 },
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl From<SkipReason> for AppError {
    fn from(reason: SkipReason) -> Self {
        match reason {
            SkipReason::FetchFailed { message } => AppError::Upstream(message),
            other => AppError::NotFound(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::InsufficientHistory {
            bars: 10,
            required: 20,
        };
        assert_eq!(reason.to_string(), "insufficient history: 10 bars, 20 required");
    }

    #[test]
    fn test_skip_reason_serialization() {
        let reason = SkipReason::IndicatorUndefined {
            indicator: "RSI".to_string(),
        };
        let json = serde_json::to_string(&reason).unwrap();
        assert_eq!(json, r#"{"kind":"indicator_undefined","indicator":"RSI"}"#);
    }

    #[test]
    fn test_fetch_error_into_skip_reason() {
        let reason: SkipReason = FetchError::Status(404).into();
        assert_eq!(
            reason,
            SkipReason::FetchFailed {
                message: "API error: 404".to_string()
            }
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        let cases = vec![
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::from(FetchError::Request("timeout".into())),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_skip_reason_into_app_error() {
        let missing: AppError = SkipReason::NoData.into();
        assert!(matches!(missing, AppError::NotFound(_)));

        let upstream: AppError = SkipReason::from(FetchError::Status(503)).into();
        assert!(matches!(upstream, AppError::Upstream(ref m) if m == "API error: 503"));
    }
}
