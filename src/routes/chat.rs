use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::{ChatRequest, ChatResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/", post(chat))
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    info!("POST /chat");
    let response = state
        .chat_service
        .reply(&request.initial_data, &request.user_message)
        .await?;
    Ok(Json(ChatResponse { response }))
}
