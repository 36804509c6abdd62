use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{error, info};

use crate::errors::{AppError, LlmError};
use crate::external::financials::FinancialsProvider;
use crate::models::{AnnualSeries, FinancialData, FinancialDataResponse};
use crate::services::llm_service::{CompletionRequest, LlmService};

const FISCAL_YEARS: usize = 5;

fn ticker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9.\-]{0,9}$").expect("valid ticker regex"))
}

fn build_ticker_prompt(company_name: &str) -> String {
    format!(
        "You are an expert in finance. Given the company name '{}', provide its stock ticker symbol. \
Return only the ticker symbol.",
        company_name
    )
}

/// Keep the most recent fiscal years; non-finite values become `None`.
fn recent_years(mut points: Vec<(String, f64)>) -> AnnualSeries {
    points.sort_by(|a, b| b.0.cmp(&a.0));
    points
        .into_iter()
        .take(FISCAL_YEARS)
        .map(|(date, value)| (date, value.is_finite().then_some(value)))
        .collect()
}

/// Ticker inference and annual revenue / net income lookup
pub struct FinancialService {
    provider: Arc<dyn FinancialsProvider>,
    llm_service: Arc<LlmService>,
}

impl FinancialService {
    pub fn new(provider: Arc<dyn FinancialsProvider>, llm_service: Arc<LlmService>) -> Self {
        Self {
            provider,
            llm_service,
        }
    }

    pub async fn infer_ticker(&self, company_name: &str) -> Result<String, AppError> {
        let request = CompletionRequest::new(build_ticker_prompt(company_name), 0.1).with_max_tokens(10);
        let reply = self.llm_service.complete(request).await.map_err(|e| {
            error!("Ticker inference failed for '{}': {}", company_name, e);
            AppError::Generation(e)
        })?;

        let ticker = reply.trim().to_uppercase();
        if !ticker_pattern().is_match(&ticker) {
            return Err(AppError::Generation(LlmError::InvalidResponse(format!(
                "'{}' is not a ticker symbol",
                reply.trim()
            ))));
        }

        info!("Inferred ticker {} for '{}'", ticker, company_name);
        Ok(ticker)
    }

    pub async fn get_financial_data(&self, company_name: &str) -> Result<FinancialDataResponse, AppError> {
        let company_name = company_name.trim();
        if company_name.is_empty() {
            return Err(AppError::InvalidInput("Company name cannot be empty".to_string()));
        }

        let ticker_symbol = self.infer_ticker(company_name).await?;
        let statement = self.provider.income_statement(&ticker_symbol).await?;

        let (Some(revenue), Some(net_income)) = (statement.total_revenue, statement.net_income) else {
            return Err(AppError::DataUnavailable(format!(
                "Financial data (revenue or net income) not available for {}",
                ticker_symbol
            )));
        };

        Ok(FinancialDataResponse {
            ticker_symbol,
            financial_data: FinancialData {
                revenue: recent_years(revenue),
                net_income: recent_years(net_income),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IncomeStatement;
    use crate::services::llm_service::LlmProvider;
    use async_trait::async_trait;

    struct FixedReply(&'static str);

    #[async_trait]
    impl LlmProvider for FixedReply {
        async fn generate_completion(&self, request: CompletionRequest) -> Result<String, LlmError> {
            assert_eq!(request.max_tokens, Some(10));
            Ok(self.0.to_string())
        }

        fn model(&self) -> &str {
            "fixed"
        }
    }

    struct StaticFinancials(IncomeStatement);

    #[async_trait]
    impl FinancialsProvider for StaticFinancials {
        async fn income_statement(&self, ticker: &str) -> Result<IncomeStatement, AppError> {
            assert_eq!(ticker, "TSLA");
            Ok(self.0.clone())
        }
    }

    fn years(values: &[(&str, f64)]) -> Option<Vec<(String, f64)>> {
        Some(values.iter().map(|(d, v)| (d.to_string(), *v)).collect())
    }

    fn service(reply: &'static str, statement: IncomeStatement) -> FinancialService {
        FinancialService::new(
            Arc::new(StaticFinancials(statement)),
            Arc::new(LlmService::with_provider(Arc::new(FixedReply(reply)))),
        )
    }

    #[tokio::test]
    async fn test_infer_ticker_normalizes_reply() {
        let svc = service(" tsla\n", IncomeStatement::default());
        assert_eq!(svc.infer_ticker("Tesla").await.unwrap(), "TSLA");
    }

    #[tokio::test]
    async fn test_infer_ticker_rejects_prose() {
        let svc = service("The ticker for Tesla is TSLA", IncomeStatement::default());
        assert!(matches!(
            svc.infer_ticker("Tesla").await,
            Err(AppError::Generation(LlmError::InvalidResponse(_)))
        ));
    }

    #[tokio::test]
    async fn test_financial_data_keeps_five_latest_years_and_nulls_nan() {
        let statement = IncomeStatement {
            total_revenue: years(&[
                ("2018-12-31", 21.4e9),
                ("2019-12-31", 24.5e9),
                ("2020-12-31", 31.5e9),
                ("2021-12-31", 53.8e9),
                ("2022-12-31", 81.4e9),
                ("2023-12-31", 96.7e9),
            ]),
            net_income: years(&[("2022-12-31", 12.5e9), ("2023-12-31", f64::NAN)]),
        };
        let svc = service("TSLA", statement);

        let response = svc.get_financial_data("  Tesla ").await.unwrap();
        assert_eq!(response.ticker_symbol, "TSLA");
        let revenue = &response.financial_data.revenue;
        assert_eq!(revenue.len(), 5);
        assert!(!revenue.contains_key("2018-12-31"));
        assert_eq!(revenue["2023-12-31"], Some(96.7e9));
        assert_eq!(response.financial_data.net_income["2023-12-31"], None);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["financial_data"]["net_income"]["2023-12-31"].is_null());
    }

    #[tokio::test]
    async fn test_missing_series_is_data_unavailable() {
        let statement = IncomeStatement {
            total_revenue: years(&[("2023-12-31", 96.7e9)]),
            net_income: None,
        };
        let svc = service("TSLA", statement);
        assert!(matches!(
            svc.get_financial_data("Tesla").await,
            Err(AppError::DataUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_company_is_invalid_input() {
        let svc = service("TSLA", IncomeStatement::default());
        assert!(matches!(
            svc.get_financial_data(" ").await,
            Err(AppError::InvalidInput(_))
        ));
    }
}
