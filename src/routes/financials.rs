use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{CompanyRequest, FinancialDataResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-financial-data", post(get_financial_data))
        .route("/get-financial-data/", post(get_financial_data))
}

/// POST /get-financial-data
pub async fn get_financial_data(
    State(state): State<AppState>,
    Json(request): Json<CompanyRequest>,
) -> Result<Json<FinancialDataResponse>, AppError> {
    info!("POST /get-financial-data - company: '{}'", request.company_name);
    let data = state
        .financial_service
        .get_financial_data(&request.company_name)
        .await
        .map_err(|e| {
            error!("Failed to fetch financial data for '{}': {}", request.company_name, e);
            e
        })?;
    Ok(Json(data))
}
