pub mod aggregation_service;
pub mod chat_service;
pub mod direction_service;
pub mod financial_service;
pub mod insight_service;
pub mod llm_service;
pub mod narrative_service;
pub mod news_service;
