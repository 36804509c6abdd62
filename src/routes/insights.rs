use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{DirectionReport, InsightResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:symbol", get(analyze))
        .route("/:symbol/direction", get(direction))
}

/// GET /analyze/:symbol
///
/// Quarterly price aggregates and a generated narrative analysis
pub async fn analyze(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<InsightResult>, AppError> {
    info!("GET /analyze/{} - Building stock insights", symbol);
    let insights = state.insight_service.get_insights(&symbol).await.map_err(|e| {
        error!("Error analyzing stock {}: {}", symbol, e);
        e
    })?;
    Ok(Json(insights))
}

/// GET /analyze/:symbol/direction
pub async fn direction(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DirectionReport>, AppError> {
    info!("GET /analyze/{}/direction - Estimating direction probabilities", symbol);
    let report = state.insight_service.direction(&symbol).map_err(|e| {
        error!("Error estimating direction for {}: {}", symbol, e);
        e
    })?;
    Ok(Json(report))
}
