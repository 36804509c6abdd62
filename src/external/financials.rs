use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::IncomeStatement;

const REVENUE_SERIES: &str = "annualTotalRevenue";
const NET_INCOME_SERIES: &str = "annualNetIncome";

/// Trait for annual income statement providers
#[async_trait]
pub trait FinancialsProvider: Send + Sync {
    async fn income_statement(&self, ticker: &str) -> Result<IncomeStatement, AppError>;
}

/// Yahoo Finance fundamentals time-series endpoint. No API key required.
pub struct YahooFundamentalsProvider {
    base_url: String,
    client: Client,
}

impl YahooFundamentalsProvider {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; StockInsights/0.1)")
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create financials HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

/// Extract `(asOfDate, value)` pairs for one series type.
///
/// Entries whose value is absent are kept as NaN so callers can report them as
/// missing; `null` placeholders carry no date and are skipped.
fn extract_series(body: &Value, series: &str) -> Option<Vec<(String, f64)>> {
    let results = body.pointer("/timeseries/result")?.as_array()?;
    let entries = results
        .iter()
        .find_map(|result| result.get(series))?
        .as_array()?;

    let points: Vec<(String, f64)> = entries
        .iter()
        .filter_map(|entry| {
            let date = entry.get("asOfDate")?.as_str()?.to_string();
            let value = entry
                .pointer("/reportedValue/raw")
                .and_then(Value::as_f64)
                .unwrap_or(f64::NAN);
            Some((date, value))
        })
        .collect();

    if points.is_empty() {
        None
    } else {
        Some(points)
    }
}

#[async_trait]
impl FinancialsProvider for YahooFundamentalsProvider {
    async fn income_statement(&self, ticker: &str) -> Result<IncomeStatement, AppError> {
        let now = Utc::now();
        let period1 = (now - Duration::days(365 * 10)).timestamp().to_string();
        let period2 = now.timestamp().to_string();
        let types = format!("{},{}", REVENUE_SERIES, NET_INCOME_SERIES);

        info!("Fetching annual financials for {}", ticker);
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, ticker))
            .query(&[
                ("type", types.as_str()),
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Financials request for {} failed: {}", ticker, e);
                AppError::DataUnavailable(format!("Financials request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::DataUnavailable(format!(
                "Financials provider returned HTTP {} for {}",
                response.status(),
                ticker
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            AppError::DataUnavailable(format!("Failed to parse financials response: {}", e))
        })?;

        Ok(IncomeStatement {
            total_revenue: extract_series(&body, REVENUE_SERIES),
            net_income: extract_series(&body, NET_INCOME_SERIES),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_series_reads_reported_values() {
        let body = json!({
            "timeseries": {
                "result": [
                    {
                        "meta": {"type": ["annualTotalRevenue"]},
                        "annualTotalRevenue": [
                            {"asOfDate": "2022-09-30", "reportedValue": {"raw": 394328000000.0}},
                            null,
                            {"asOfDate": "2023-09-30", "reportedValue": {"raw": 383285000000.0}}
                        ]
                    },
                    {
                        "meta": {"type": ["annualNetIncome"]},
                        "annualNetIncome": [
                            {"asOfDate": "2023-09-30"}
                        ]
                    }
                ]
            }
        });

        let revenue = extract_series(&body, REVENUE_SERIES).unwrap();
        assert_eq!(revenue.len(), 2);
        assert_eq!(revenue[1], ("2023-09-30".to_string(), 383285000000.0));

        let net_income = extract_series(&body, NET_INCOME_SERIES).unwrap();
        assert!(net_income[0].1.is_nan());
    }

    #[test]
    fn test_missing_series_is_none() {
        let body = json!({"timeseries": {"result": [{"meta": {"type": ["annualNetIncome"]}}]}});
        assert!(extract_series(&body, REVENUE_SERIES).is_none());
        assert!(extract_series(&json!({}), NET_INCOME_SERIES).is_none());
    }
}
