use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use crate::config::NewsConfig;
use crate::errors::AppError;

/// Article as delivered by the news source; any field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
}

/// Trait for news sources
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_articles(
        &self,
        company_name: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawArticle>, AppError>;
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

/// newsapi.org `everything` endpoint
pub struct NewsApiProvider {
    api_key: Option<String>,
    base_url: String,
    page_size: usize,
    client: Client,
}

impl NewsApiProvider {
    pub fn new(config: &NewsConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create news HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            client,
        })
    }
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    async fn fetch_articles(
        &self,
        company_name: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawArticle>, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::NewsSource("NEWS_API_KEY is not configured".to_string()))?;

        info!("Fetching news for '{}' from {} to {}", company_name, from, to);

        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();
        let page_size = self.page_size.to_string();

        let response = self
            .client
            .get(format!("{}/everything", self.base_url))
            .query(&[
                ("q", company_name),
                ("language", "en"),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("sortBy", "relevancy"),
                ("pageSize", page_size.as_str()),
                ("apiKey", api_key),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("News API request failed: {}", e);
                AppError::NewsSource(format!("News API request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("News API error {}: {}", status, error_text);
            return Err(AppError::NewsSource(format!(
                "Failed to fetch articles (HTTP {}): {}",
                status, error_text
            )));
        }

        let body: EverythingResponse = response.json().await.map_err(|e| {
            error!("Failed to parse News API response: {}", e);
            AppError::NewsSource(format!("Failed to parse news response: {}", e))
        })?;

        info!("Fetched {} candidate articles", body.articles.len());
        Ok(body.articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_article_tolerates_nulls_and_missing_fields() {
        let json = r#"{"status":"ok","articles":[
            {"title":"Nvidia beats","description":null,"url":"https://x","publishedAt":"2024-03-08T10:00:00Z"}
        ]}"#;
        let parsed: EverythingResponse = serde_json::from_str(json).unwrap();
        let article = &parsed.articles[0];
        assert_eq!(article.title.as_deref(), Some("Nvidia beats"));
        assert!(article.description.is_none());
        assert!(article.content.is_none());
        assert_eq!(article.published_at.as_deref(), Some("2024-03-08T10:00:00Z"));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_news_source_error() {
        let provider = NewsApiProvider::new(&NewsConfig::default()).unwrap();
        let today = chrono::Utc::now().date_naive();
        let result = provider.fetch_articles("Tesla", today, today).await;
        assert!(matches!(result, Err(AppError::NewsSource(_))));
    }
}
