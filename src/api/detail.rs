//! Deep-dive API endpoints.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::ApiResponse;
use crate::error::Result;
use crate::types::{DetailView, TradePlan};
use crate::AppState;

/// Create the detail router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/detail/:symbol", get(get_detail))
        .route("/api/plan/:symbol", get(get_plan))
}

/// Trade plan, snapshot, news and bars for one symbol.
async fn get_detail(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<DetailView>>> {
    let detail = state.scanner.detail(&symbol).await?;
    Ok(Json(ApiResponse::new(detail)))
}

/// Trade plan only.
async fn get_plan(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<TradePlan>>> {
    let plan = state.scanner.plan(&symbol).await?;
    Ok(Json(ApiResponse::new(plan)))
}
