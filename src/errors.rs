use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures of the text-generation service
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM provider is not configured (missing {0})")]
    Disabled(&'static str),
    #[error("LLM request timed out")]
    Timeout,
    #[error("LLM provider rate limited the request")]
    RateLimited,
    #[error("Network error: {0}")]
    Network(String),
    #[error("LLM API error: {0}")]
    Api(String),
    #[error("Invalid LLM response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
    #[error("News source error: {0}")]
    NewsSource(String),
    #[error("Generation error: {0}")]
    Generation(#[from] LlmError),
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::DataUnavailable(_) => "data_unavailable",
            AppError::NewsSource(_) => "news_source_error",
            AppError::Generation(_) => "generation_error",
            AppError::InsufficientData(_) => "insufficient_data",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::DataUnavailable(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NewsSource(_) | AppError::Generation(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.kind(),
            "detail": self.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        AppError::Internal(format!("Price dataset error: {}", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_4xx() {
        assert_eq!(AppError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::DataUnavailable("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::InsufficientData("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_upstream_errors_map_to_bad_gateway() {
        assert_eq!(AppError::NewsSource("503".into()).status(), StatusCode::BAD_GATEWAY);
        let err: AppError = LlmError::Timeout.into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.kind(), "generation_error");
        assert!(err.to_string().contains("timed out"));
    }
}
