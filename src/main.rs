use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use stock_insights::app;
use stock_insights::config::AppConfig;
use stock_insights::external::financials::YahooFundamentalsProvider;
use stock_insights::external::news_api::NewsApiProvider;
use stock_insights::external::price_source::{resample_to_weekly, CsvPriceStore};
use stock_insights::logging::{init_logging, LoggingConfig};
use stock_insights::services::chat_service::ChatService;
use stock_insights::services::financial_service::FinancialService;
use stock_insights::services::insight_service::InsightService;
use stock_insights::services::llm_service::LlmService;
use stock_insights::services::news_service::NewsService;
use stock_insights::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "stock-insights-backend", about = "Stock insights API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Resample a daily price CSV into the weekly dataset layout
    Resample { input: PathBuf, output: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match Cli::parse().command.unwrap_or(Command::Serve) {
        Command::Serve => serve(AppConfig::from_env()).await,
        Command::Resample { input, output } => resample(&input, &output),
    }
}

fn resample(input: &Path, output: &Path) -> anyhow::Result<()> {
    let reader = std::fs::File::open(input)
        .with_context(|| format!("Cannot open {}", input.display()))?;
    let writer = std::fs::File::create(output)
        .with_context(|| format!("Cannot create {}", output.display()))?;
    let rows = resample_to_weekly(reader, writer)?;
    tracing::info!("Wrote {} weekly rows to {}", rows, output.display());
    Ok(())
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let prices = CsvPriceStore::from_path(&config.price_data_path)
        .with_context(|| format!("Failed to load {}", config.price_data_path.display()))?;

    let llm_service = Arc::new(LlmService::new(&config.llm));
    let news_provider = NewsApiProvider::new(&config.news)?;
    let financials_provider = YahooFundamentalsProvider::new(&config.financials_base_url)?;

    let state = AppState {
        insight_service: Arc::new(InsightService::new(Arc::new(prices), llm_service.clone())),
        news_service: Arc::new(NewsService::new(
            Arc::new(news_provider),
            llm_service.clone(),
            config.news.lookback_days,
        )),
        financial_service: Arc::new(FinancialService::new(
            Arc::new(financials_provider),
            llm_service.clone(),
        )),
        chat_service: Arc::new(ChatService::new(llm_service)),
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Stock insights backend running at http://{}/", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
