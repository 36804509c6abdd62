use std::sync::Arc;

use tracing::info;

use crate::errors::AppError;
use crate::external::price_source::PriceSource;
use crate::models::{DirectionReport, Granularity, InsightResult};
use crate::services::llm_service::LlmService;
use crate::services::{aggregation_service, direction_service, narrative_service};

/// Quarterly price summary plus generated narrative, recomputed per call.
pub struct InsightService {
    prices: Arc<dyn PriceSource>,
    llm_service: Arc<LlmService>,
}

fn validate_symbol(symbol: &str) -> Result<String, AppError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(AppError::InvalidInput("Symbol cannot be empty".to_string()));
    }
    Ok(symbol.to_uppercase())
}

impl InsightService {
    pub fn new(prices: Arc<dyn PriceSource>, llm_service: Arc<LlmService>) -> Self {
        Self { prices, llm_service }
    }

    pub async fn get_insights(&self, symbol: &str) -> Result<InsightResult, AppError> {
        let symbol = validate_symbol(symbol)?;
        let periods =
            aggregation_service::aggregate_symbol(self.prices.as_ref(), &symbol, Granularity::Quarterly)?;
        if periods.is_empty() {
            return Err(AppError::DataUnavailable(format!(
                "No quarterly periods for symbol {}",
                symbol
            )));
        }

        let narrative =
            narrative_service::compose_narrative(&self.llm_service, &symbol, &periods).await?;
        info!("Built insights for {} ({} quarters)", symbol, periods.len());

        Ok(InsightResult {
            symbol,
            periods,
            narrative,
        })
    }

    /// Direction/volume probabilities over the symbol's quarterly history.
    pub fn direction(&self, symbol: &str) -> Result<DirectionReport, AppError> {
        let symbol = validate_symbol(symbol)?;
        let periods =
            aggregation_service::aggregate_symbol(self.prices.as_ref(), &symbol, Granularity::Quarterly)?;
        let stats = direction_service::estimate(&periods)?;

        Ok(DirectionReport {
            symbol,
            periods: periods.len(),
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LlmError;
    use crate::external::price_source::CsvPriceStore;
    use crate::services::llm_service::{CompletionRequest, LlmProvider};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DATASET: &str = "\
Date,Symbol,Open,High,Low,Close,Volume,Dividends,Stock Splits
2024-01-05,AAPL,10,12,9,11,100,0,0
2024-04-05,AAPL,11,11,8,9,300,0,0
2024-01-05,JNJ,150,152,149,151,80,0,0
";

    #[derive(Default)]
    struct CountingLlm {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmProvider for CountingLlm {
        async fn generate_completion(&self, _request: CompletionRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("narrative".to_string())
        }

        fn model(&self) -> &str {
            "counting"
        }
    }

    fn service(llm: Arc<CountingLlm>) -> InsightService {
        let store = CsvPriceStore::from_reader(DATASET.as_bytes()).unwrap();
        InsightService::new(Arc::new(store), Arc::new(LlmService::with_provider(llm)))
    }

    #[tokio::test]
    async fn test_get_insights_returns_quarters_and_narrative() {
        let llm = Arc::new(CountingLlm::default());
        let result = service(llm.clone()).get_insights("aapl").await.unwrap();

        assert_eq!(result.symbol, "AAPL");
        assert_eq!(result.periods.len(), 2);
        assert_eq!(result.narrative, "narrative");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_symbol_never_calls_llm() {
        let llm = Arc::new(CountingLlm::default());
        let result = service(llm.clone()).get_insights("MSFT").await;

        assert!(matches!(result, Err(AppError::DataUnavailable(_))));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_every_call_recomputes() {
        let llm = Arc::new(CountingLlm::default());
        let svc = service(llm.clone());
        svc.get_insights("JNJ").await.unwrap();
        svc.get_insights("JNJ").await.unwrap();
        assert_eq!(llm.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_blank_symbol_is_invalid_input() {
        let svc = service(Arc::new(CountingLlm::default()));
        assert!(matches!(svc.get_insights("  ").await, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_direction_over_quarters() {
        let report = service(Arc::new(CountingLlm::default())).direction("AAPL").unwrap();
        assert_eq!(report.periods, 2);
        assert_eq!(report.stats.p_increase, 0.5);
        assert_eq!(report.stats.p_decrease_given_high_vol, 1.0);
    }
}
