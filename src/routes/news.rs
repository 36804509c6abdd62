use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{CompanyRequest, TopArticlesResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    // Trailing-slash form is what the dashboard posts to
    Router::new()
        .route("/get-top-articles", post(get_top_articles))
        .route("/get-top-articles/", post(get_top_articles))
}

/// POST /get-top-articles
///
/// Recent articles mentioning the company, ranked by relevance (at most 5)
pub async fn get_top_articles(
    State(state): State<AppState>,
    Json(request): Json<CompanyRequest>,
) -> Result<Json<TopArticlesResponse>, AppError> {
    info!("POST /get-top-articles - company: '{}'", request.company_name);
    let top_articles = state
        .news_service
        .get_top_articles(&request.company_name)
        .await
        .map_err(|e| {
            error!("Failed to rank articles for '{}': {}", request.company_name, e);
            e
        })?;
    Ok(Json(TopArticlesResponse { top_articles }))
}
