use std::sync::Arc;

use crate::services::chat_service::ChatService;
use crate::services::financial_service::FinancialService;
use crate::services::insight_service::InsightService;
use crate::services::news_service::NewsService;

/// Handles shared by every request; built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub insight_service: Arc<InsightService>,
    pub news_service: Arc<NewsService>,
    pub financial_service: Arc<FinancialService>,
    pub chat_service: Arc<ChatService>,
}
