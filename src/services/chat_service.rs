use std::sync::Arc;

use tracing::info;

use crate::errors::AppError;
use crate::services::llm_service::{CompletionRequest, LlmService};

const CHAT_TEMPERATURE: f32 = 0.7;
const CHAT_MAX_TOKENS: u32 = 200;

fn build_chat_prompt(initial_data: &str, user_message: &str) -> String {
    format!("Context: {}\n\nUser: {}\n\nAssistant:", initial_data, user_message)
}

/// Follow-up questions answered against a previously generated analysis
pub struct ChatService {
    llm_service: Arc<LlmService>,
}

impl ChatService {
    pub fn new(llm_service: Arc<LlmService>) -> Self {
        Self { llm_service }
    }

    pub async fn reply(&self, initial_data: &str, user_message: &str) -> Result<String, AppError> {
        if user_message.trim().is_empty() {
            return Err(AppError::InvalidInput("User message cannot be empty".to_string()));
        }

        info!(
            "Answering chat message ({} chars of context)",
            initial_data.len()
        );
        let request = CompletionRequest::new(build_chat_prompt(initial_data, user_message), CHAT_TEMPERATURE)
            .with_max_tokens(CHAT_MAX_TOKENS);

        Ok(self.llm_service.complete(request).await?)
    }
}
