use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use futures::future::join_all;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::external::news_api::{NewsProvider, RawArticle};
use crate::models::NewsArticle;
use crate::services::llm_service::{CompletionRequest, LlmService};

pub const SCORING_BATCH_SIZE: usize = 5;
pub const TOP_ARTICLES: usize = 5;

/// Outcome of scoring one batch of articles.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchScores {
    Scored(Vec<f64>),
    /// The model reply was unusable; every article in the batch scores 0.0.
    Degraded { reason: String },
}

impl BatchScores {
    pub fn is_degraded(&self) -> bool {
        matches!(self, BatchScores::Degraded { .. })
    }

    fn into_scores(self, len: usize) -> Vec<f64> {
        match self {
            BatchScores::Scored(scores) => scores,
            BatchScores::Degraded { .. } => vec![0.0; len],
        }
    }
}

/// Keep only articles whose title mentions the company (case-insensitive).
pub fn filter_by_title(articles: Vec<RawArticle>, company_name: &str) -> Vec<RawArticle> {
    let needle = company_name.to_lowercase();
    articles
        .into_iter()
        .filter(|a| {
            a.title
                .as_deref()
                .map(|t| t.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .collect()
}

pub fn normalize(raw: RawArticle) -> NewsArticle {
    NewsArticle {
        title: raw.title.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        content: raw.content.unwrap_or_default(),
        url: raw.url.unwrap_or_default(),
        published_at: raw.published_at.unwrap_or_default(),
        relevance_score: 0.0,
    }
}

fn build_relevance_prompt(batch: &[NewsArticle]) -> String {
    let articles_text: String = batch
        .iter()
        .enumerate()
        .map(|(i, article)| {
            format!(
                "Article {}:\nTitle: {}\nDescription: {}\nContent: {}\n\n",
                i + 1,
                article.title,
                article.description,
                article.content
            )
        })
        .collect();

    format!(
        "You are an expert financial analyst. Your task is to evaluate the relevance of the following news articles \
for making investment decisions. Consider factors such as financial performance, market trends, strategic announcements, \
regulatory changes, or other material information that could impact the company's stock price. \
Provide a relevance score between 0 and 1 for each article, separated by commas.\n\n\
{}Relevance Scores (comma-separated):",
        articles_text
    )
}

/// Parse a comma-separated list of exactly `expected` scores in [0, 1].
pub fn parse_scores(response: &str, expected: usize) -> Result<Vec<f64>, String> {
    let scores = response
        .trim()
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", part))
                .and_then(|score| {
                    if (0.0..=1.0).contains(&score) {
                        Ok(score)
                    } else {
                        Err(format!("score {} outside [0, 1]", score))
                    }
                })
        })
        .collect::<Result<Vec<f64>, String>>()?;

    if scores.len() != expected {
        return Err(format!("expected {} scores, got {}", expected, scores.len()));
    }
    Ok(scores)
}

/// Sort by relevance descending (ties keep fetch order) and keep the top `n`.
pub fn rank(mut articles: Vec<NewsArticle>, n: usize) -> Vec<NewsArticle> {
    articles.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    articles.truncate(n);
    articles
}

/// Fetches recent company news and ranks it by model-assessed relevance
pub struct NewsService {
    provider: Arc<dyn NewsProvider>,
    llm_service: Arc<LlmService>,
    lookback_days: i64,
}

impl NewsService {
    pub fn new(provider: Arc<dyn NewsProvider>, llm_service: Arc<LlmService>, lookback_days: i64) -> Self {
        Self {
            provider,
            llm_service,
            lookback_days,
        }
    }

    fn window(&self) -> (NaiveDate, NaiveDate) {
        let today = Utc::now().date_naive();
        (today - Duration::days(self.lookback_days), today)
    }

    pub async fn score_batch(&self, batch: &[NewsArticle]) -> BatchScores {
        let request = CompletionRequest::new(build_relevance_prompt(batch), 0.1).with_max_tokens(50);

        match self.llm_service.complete(request).await {
            Ok(response) => match parse_scores(&response, batch.len()) {
                Ok(scores) => BatchScores::Scored(scores),
                Err(reason) => BatchScores::Degraded {
                    reason: format!("unparsable scores ({}): {:?}", reason, response),
                },
            },
            Err(e) => BatchScores::Degraded {
                reason: e.to_string(),
            },
        }
    }

    /// Top articles about `company_name` from the lookback window, best first.
    pub async fn get_top_articles(&self, company_name: &str) -> Result<Vec<NewsArticle>, AppError> {
        let company_name = company_name.trim();
        if company_name.is_empty() {
            return Err(AppError::InvalidInput("Company name cannot be empty".to_string()));
        }

        let (from, to) = self.window();
        let raw = self.provider.fetch_articles(company_name, from, to).await?;
        let fetched = raw.len();

        let mut articles: Vec<NewsArticle> = filter_by_title(raw, company_name)
            .into_iter()
            .map(normalize)
            .collect();
        info!(
            "{} of {} articles mention '{}' in the title",
            articles.len(),
            fetched,
            company_name
        );
        if articles.is_empty() {
            return Ok(articles);
        }

        // Batches are independent prompts; join_all keeps results in batch order
        let outcomes = join_all(
            articles
                .chunks(SCORING_BATCH_SIZE)
                .map(|batch| self.score_batch(batch)),
        )
        .await;

        for (index, (batch, outcome)) in articles
            .chunks_mut(SCORING_BATCH_SIZE)
            .zip(outcomes)
            .enumerate()
        {
            if let BatchScores::Degraded { reason } = &outcome {
                warn!("Relevance batch {} degraded to zero scores: {}", index, reason);
            }
            let scores = outcome.into_scores(batch.len());
            for (article, score) in batch.iter_mut().zip(scores) {
                article.relevance_score = score;
            }
        }

        Ok(rank(articles, TOP_ARTICLES))
    }
}
