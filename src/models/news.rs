use serde::{Deserialize, Serialize};

/// A news article normalized for relevance ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub content: String,
    pub url: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    pub relevance_score: f64,
}

/// Request body naming a company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRequest {
    pub company_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopArticlesResponse {
    pub top_articles: Vec<NewsArticle>,
}
