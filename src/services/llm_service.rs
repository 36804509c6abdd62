use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::LlmConfig;
use crate::errors::LlmError;

/// A single-turn completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Trait for text-generation backends
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate_completion(&self, request: CompletionRequest) -> Result<String, LlmError>;

    fn model(&self) -> &str;
}

/// OpenAI-compatible chat completion structures
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Groq-hosted chat model behind its OpenAI-compatible API
pub struct GroqProvider {
    api_key: String,
    base_url: String,
    model: String,
    client: Client,
}

impl GroqProvider {
    pub fn new(api_key: String, config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client,
        })
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    async fn generate_completion(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            info!(
                "LLM completion tokens: {} prompt + {} completion",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Shared handle to the configured text-generation backend.
///
/// Constructed once at startup; without an API key every call fails with
/// [`LlmError::Disabled`].
pub struct LlmService {
    provider: Option<Arc<dyn LlmProvider>>,
}

impl LlmService {
    pub fn new(config: &LlmConfig) -> Self {
        let provider = match &config.api_key {
            Some(api_key) => match GroqProvider::new(api_key.clone(), config) {
                Ok(provider) => {
                    info!("Initializing LLM service with model: {}", config.model);
                    Some(Arc::new(provider) as Arc<dyn LlmProvider>)
                }
                Err(e) => {
                    warn!("Failed to initialize LLM provider: {}. LLM features disabled.", e);
                    None
                }
            },
            None => {
                warn!("GROQ_API_KEY not configured. LLM features disabled.");
                None
            }
        };

        Self { provider }
    }

    pub fn with_provider(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    pub fn disabled() -> Self {
        Self { provider: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(LlmError::Disabled("GROQ_API_KEY"))?;

        info!(
            "Requesting completion (model: {}, prompt: {} chars, max_tokens: {:?})",
            provider.model(),
            request.prompt.len(),
            request.max_tokens
        );
        provider.generate_completion(request).await
    }
}
