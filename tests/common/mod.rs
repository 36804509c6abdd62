#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;

use stock_insights::app::create_app;
use stock_insights::errors::{AppError, LlmError};
use stock_insights::external::financials::FinancialsProvider;
use stock_insights::external::news_api::{NewsProvider, RawArticle};
use stock_insights::external::price_source::CsvPriceStore;
use stock_insights::models::IncomeStatement;
use stock_insights::services::chat_service::ChatService;
use stock_insights::services::financial_service::FinancialService;
use stock_insights::services::insight_service::InsightService;
use stock_insights::services::llm_service::{CompletionRequest, LlmProvider, LlmService};
use stock_insights::services::news_service::NewsService;
use stock_insights::state::AppState;

pub const DATASET: &str = "\
Date,Symbol,Open,High,Low,Close,Volume,Dividends,Stock Splits
2023-10-06,NVDA,44.0,46.0,43.0,45.0,900,0.0,0.0
2023-12-29,NVDA,48.0,50.0,47.5,49.5,1100,0.004,0.0
2024-01-05,NVDA,49.0,52.0,47.0,48.0,1500,0.0,0.0
2024-03-29,NVDA,86.0,90.0,85.0,90.0,2500,0.004,0.0
2024-04-05,NVDA,90.0,91.0,84.0,88.0,2000,0.0,0.0
2024-01-05,JPM,170.0,172.0,169.0,171.0,300,1.05,0.0
";

/// Answers each kind of prompt the services send and counts calls.
#[derive(Default)]
pub struct FakeLlm {
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
    pub fail_scoring: bool,
}

impl FakeLlm {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    async fn generate_completion(&self, request: CompletionRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let prompt = request.prompt;

        if prompt.contains("Relevance Scores") {
            if self.fail_scoring {
                return Ok("n/a".to_string());
            }
            let count = (1..=5)
                .filter(|i| prompt.contains(&format!("Article {}:", i)))
                .count();
            // Later articles in each batch score higher
            let scores: Vec<String> = (0..count).map(|i| format!("{:.1}", 0.1 + i as f64 * 0.2)).collect();
            return Ok(scores.join(", "));
        }
        if prompt.contains("stock ticker symbol") {
            return Ok("nvda".to_string());
        }
        if prompt.contains("Analyze the following stock data") {
            return Ok("NVDA has trended upward with elevated volatility.".to_string());
        }
        if prompt.starts_with("Context:") {
            return Ok("Volatility was above average.".to_string());
        }
        Err(LlmError::InvalidResponse("unexpected prompt".to_string()))
    }

    fn model(&self) -> &str {
        "fake"
    }
}

pub struct FakeNews(pub Vec<RawArticle>);

#[async_trait]
impl NewsProvider for FakeNews {
    async fn fetch_articles(
        &self,
        _company_name: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<RawArticle>, AppError> {
        Ok(self.0.clone())
    }
}

pub struct FakeFinancials;

#[async_trait]
impl FinancialsProvider for FakeFinancials {
    async fn income_statement(&self, ticker: &str) -> Result<IncomeStatement, AppError> {
        if ticker != "NVDA" {
            return Ok(IncomeStatement::default());
        }
        Ok(IncomeStatement {
            total_revenue: Some(vec![
                ("2023-01-31".to_string(), 26.97e9),
                ("2024-01-31".to_string(), 60.92e9),
            ]),
            net_income: Some(vec![
                ("2023-01-31".to_string(), 4.37e9),
                ("2024-01-31".to_string(), f64::NAN),
            ]),
        })
    }
}

pub fn article(title: &str) -> RawArticle {
    RawArticle {
        title: Some(title.to_string()),
        description: Some(format!("About {}", title)),
        content: None,
        url: Some(format!("https://news.example/{}", title.replace(' ', "-"))),
        published_at: Some("2024-04-05T12:00:00Z".to_string()),
    }
}

pub fn build_app(llm: Arc<FakeLlm>, news: Vec<RawArticle>) -> Router {
    let prices = CsvPriceStore::from_reader(DATASET.as_bytes()).expect("dataset parses");
    let llm_service = Arc::new(LlmService::with_provider(llm));

    create_app(AppState {
        insight_service: Arc::new(InsightService::new(Arc::new(prices), llm_service.clone())),
        news_service: Arc::new(NewsService::new(Arc::new(FakeNews(news)), llm_service.clone(), 2)),
        financial_service: Arc::new(FinancialService::new(Arc::new(FakeFinancials), llm_service.clone())),
        chat_service: Arc::new(ChatService::new(llm_service)),
    })
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}
